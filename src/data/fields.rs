//! Packet header tables.

use std::fmt;

/// Format of a data packet, from the 5-bit header field.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum PacketFormat {
    Confirmed,
    Unconfirmed,
    Response,
    /// Alternate multiple block trunking control.
    Trunking,
    Other(u8),
}

impl PacketFormat {
    /// Convert a symbolic type to its associated identifier.
    pub fn to_bits(&self) -> u8 {
        use self::PacketFormat::*;

        match *self {
            Confirmed => 0b10110,
            Unconfirmed => 0b10101,
            Response => 0b00011,
            Trunking => 0b10111,
            Other(bits) => bits,
        }
    }

    /// Parse a packet format from the given 5 bits.
    pub fn from_bits(bits: u8) -> PacketFormat {
        use self::PacketFormat::*;

        assert!(bits >> 5 == 0);

        match bits {
            0b10110 => Confirmed,
            0b10101 => Unconfirmed,
            0b00011 => Response,
            0b10111 => Trunking,
            _ => Other(bits),
        }
    }

    /// Size in bits of each data block following a header of this format.
    pub fn block_bits(&self) -> usize {
        match *self {
            PacketFormat::Confirmed => 144,
            _ => 96,
        }
    }

    /// Number of user data bytes in each data block.
    pub fn block_bytes(&self) -> usize {
        match *self {
            PacketFormat::Confirmed => 16,
            _ => 12,
        }
    }
}

#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum ServiceAccessPoint {
    UnencryptedUserData,
    EncryptedUserData,
    CircuitData,
    CircuitDataControl,
    PacketData,
    ARP,
    SNDCPControl,
    ExtendedAddressing,
    RegistrationAuth,
    ChannelReassignment,
    SystemConfiguration,
    Loopback,
    Statistics,
    OutOfService,
    Paging,
    Configuration,
    UnencryptedKeyManagement,
    EncryptedKeyManagement,
    TrunkingControl,
    EncryptedTrunkingControl,
    Other(u8),
}

impl ServiceAccessPoint {
    pub fn from_bits(bits: u8) -> ServiceAccessPoint {
        use self::ServiceAccessPoint::*;

        assert!(bits >> 6 == 0);

        match bits {
            0x00 => UnencryptedUserData,
            0x01 => EncryptedUserData,
            0x02 => CircuitData,
            0x03 => CircuitDataControl,
            0x04 => PacketData,
            0x05 => ARP,
            0x06 => SNDCPControl,
            0x1F => ExtendedAddressing,
            0x20 => RegistrationAuth,
            0x21 => ChannelReassignment,
            0x22 => SystemConfiguration,
            0x23 => Loopback,
            0x24 => Statistics,
            0x25 => OutOfService,
            0x26 => Paging,
            0x27 => Configuration,
            0x28 => UnencryptedKeyManagement,
            0x29 => EncryptedKeyManagement,
            0x3D => TrunkingControl,
            0x3F => EncryptedTrunkingControl,
            _ => Other(bits),
        }
    }

    pub fn to_bits(&self) -> u8 {
        use self::ServiceAccessPoint::*;

        match *self {
            UnencryptedUserData => 0x00,
            EncryptedUserData => 0x01,
            CircuitData => 0x02,
            CircuitDataControl => 0x03,
            PacketData => 0x04,
            ARP => 0x05,
            SNDCPControl => 0x06,
            ExtendedAddressing => 0x1F,
            RegistrationAuth => 0x20,
            ChannelReassignment => 0x21,
            SystemConfiguration => 0x22,
            Loopback => 0x23,
            Statistics => 0x24,
            OutOfService => 0x25,
            Paging => 0x26,
            Configuration => 0x27,
            UnencryptedKeyManagement => 0x28,
            EncryptedKeyManagement => 0x29,
            TrunkingControl => 0x3D,
            EncryptedTrunkingControl => 0x3F,
            Other(bits) => bits,
        }
    }

    /// Whether the packet carries trunking control blocks.
    pub fn is_trunking(&self) -> bool {
        matches!(*self, ServiceAccessPoint::TrunkingControl |
                        ServiceAccessPoint::EncryptedTrunkingControl)
    }
}

impl fmt::Display for ServiceAccessPoint {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        use self::ServiceAccessPoint::*;

        let s = match *self {
            UnencryptedUserData => "USER DATA",
            EncryptedUserData => "ENC USER DATA",
            CircuitData => "CIRCUIT DATA",
            CircuitDataControl => "CIRCUIT CONTROL",
            PacketData => "PACKET DATA",
            ARP => "ARP",
            SNDCPControl => "SNDCP",
            ExtendedAddressing => "EXT ADDRESS",
            RegistrationAuth => "REGISTRATION",
            ChannelReassignment => "CHAN REASSIGN",
            SystemConfiguration => "SYS CONFIG",
            Loopback => "LOOPBACK",
            Statistics => "STATISTICS",
            OutOfService => "OUT OF SERVICE",
            Paging => "PAGING",
            Configuration => "CONFIG",
            UnencryptedKeyManagement => "KEY MGMT",
            EncryptedKeyManagement => "ENC KEY MGMT",
            TrunkingControl => "TRUNKING",
            EncryptedTrunkingControl => "ENC TRUNKING",
            Other(bits) => return write!(f, "SAP:{:02X}", bits),
        };

        f.write_str(s)
    }
}

/// Outcome reported by a response packet.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum ResponseKind {
    /// All blocks received.
    Ack,
    /// Some blocks need to be resent; the status names which.
    SelectiveNack,
    Nack(NackReason),
    Other { class: u8, kind: u8 },
}

/// Why a packet was refused.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum NackReason {
    Illegal,
    PacketCrc,
    Memory,
    OutOfSequence,
    Undeliverable,
    Other(u8),
}

impl ResponseKind {
    /// Parse the 2-bit class and 3-bit type.
    pub fn from_bits(class: u8, kind: u8) -> ResponseKind {
        match (class, kind) {
            (0b00, 0b001) => ResponseKind::Ack,
            (0b10, _) => ResponseKind::SelectiveNack,
            (0b01, k) => ResponseKind::Nack(match k {
                0b000 => NackReason::Illegal,
                0b001 => NackReason::PacketCrc,
                0b010 => NackReason::Memory,
                0b011 => NackReason::OutOfSequence,
                0b100 => NackReason::Undeliverable,
                k => NackReason::Other(k),
            }),
            (class, kind) => ResponseKind::Other { class, kind },
        }
    }
}

impl fmt::Display for ResponseKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            ResponseKind::Ack => f.write_str("ACK"),
            ResponseKind::SelectiveNack => f.write_str("SELECTIVE NACK"),
            ResponseKind::Nack(r) => write!(f, "NACK {:?}", r),
            ResponseKind::Other { class, kind } => write!(f, "CLASS:{} TYPE:{}", class, kind),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    #[should_panic]
    fn test_sap_validate() {
        ServiceAccessPoint::from_bits(0b11111111);
    }

    #[test]
    fn test_sap() {
        for bits in 0..64 {
            assert_eq!(ServiceAccessPoint::from_bits(bits).to_bits(), bits);
        }

        assert!(ServiceAccessPoint::from_bits(0x3D).is_trunking());
        assert_eq!(ServiceAccessPoint::from_bits(0x30).to_string(), "SAP:30");
    }

    #[test]
    fn test_format() {
        assert_eq!(PacketFormat::from_bits(0b10110), PacketFormat::Confirmed);
        assert_eq!(PacketFormat::from_bits(0b10111), PacketFormat::Trunking);
        assert_eq!(PacketFormat::from_bits(0b00001), PacketFormat::Other(1));
        assert_eq!(PacketFormat::Confirmed.block_bits(), 144);
        assert_eq!(PacketFormat::Unconfirmed.block_bytes(), 12);
    }

    #[test]
    fn test_response() {
        assert_eq!(ResponseKind::from_bits(0, 1), ResponseKind::Ack);
        assert_eq!(ResponseKind::from_bits(1, 1), ResponseKind::Nack(NackReason::PacketCrc));
        assert_eq!(ResponseKind::from_bits(2, 7), ResponseKind::SelectiveNack);
        assert_eq!(ResponseKind::from_bits(3, 2),
                   ResponseKind::Other { class: 3, kind: 2 });
    }
}
