//! Crate-private mutation hooks for parser-managed collections.
//!
//! These traits are nameable only inside the crate, so code outside it can
//! read child collections but cannot change them behind the parser's indices.

use super::{OptionData, PdPool, Pool, ReservationRecord, SubnetId, SubnetRecord};

pub trait SubnetStorage: SubnetRecord {
    fn create(id: SubnetId, cidr: String) -> Self;

    fn pools_mut(&mut self) -> &mut Vec<Pool>;

    fn option_data_mut(&mut self) -> &mut Vec<OptionData>;

    fn reservations_mut(&mut self) -> &mut Vec<<Self as SubnetRecord>::Reservation>;

    /// `(prefix, prefix_len)` keys of delegated prefix pools held by this subnet.
    fn pd_keys(&self) -> Vec<(String, u8)> {
        Vec::new()
    }
}

pub trait PdPoolStorage: SubnetStorage {
    fn pd_pools_mut(&mut self) -> &mut Vec<PdPool>;
}

pub trait ReservationStorage: ReservationRecord {
    fn create(ip_address: String) -> Self;
}
