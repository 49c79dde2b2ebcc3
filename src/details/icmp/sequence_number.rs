type SequenceNumberInnerType = u16;

/// Echo sequence number as carried on the wire.
#[derive(Copy, Clone, Debug, Eq, Hash, PartialEq)]
pub(crate) struct SequenceNumber(SequenceNumberInnerType);

impl SequenceNumber {
    // The session counter is wider than the protocol field, so it wraps here.
    #[allow(clippy::cast_possible_truncation)]
    pub(crate) fn from_counter(counter: u64) -> SequenceNumber {
        SequenceNumber((counter & u64::from(SequenceNumberInnerType::MAX)) as SequenceNumberInnerType)
    }
}

impl From<SequenceNumber> for SequenceNumberInnerType {
    fn from(value: SequenceNumber) -> Self {
        value.0
    }
}

impl From<SequenceNumberInnerType> for SequenceNumber {
    fn from(value: SequenceNumberInnerType) -> Self {
        SequenceNumber(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_counter_keeps_small_values() {
        assert_eq!(SequenceNumber::from(0), SequenceNumber::from_counter(0));
        assert_eq!(SequenceNumber::from(4711), SequenceNumber::from_counter(4711));
    }

    #[test]
    fn from_counter_wraps_at_field_width() {
        assert_eq!(SequenceNumber::from(u16::MAX), SequenceNumber::from_counter(65_535));
        assert_eq!(SequenceNumber::from(0), SequenceNumber::from_counter(65_536));
        assert_eq!(SequenceNumber::from(2), SequenceNumber::from_counter(65_538));
    }
}
