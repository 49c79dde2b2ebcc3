pub(crate) mod icmp;
pub(crate) mod payload;
pub(crate) mod socket;
