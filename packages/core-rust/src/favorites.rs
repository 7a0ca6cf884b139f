//! Selecting favorite schools out of a record set.

use std::collections::BTreeSet;

use crate::filter::sort_by_name;
use crate::school::School;

/// Favorite school numbers.
pub type FavoriteIds = BTreeSet<i64>;

/// Records whose id is in `ids`, sorted by name. Ids with no matching record
/// are ignored.
#[must_use]
pub fn select_favorites<'a>(schools: &'a [School], ids: &FavoriteIds) -> Vec<&'a School> {
    if ids.is_empty() {
        return Vec::new();
    }
    let mut result: Vec<&School> = schools.iter().filter(|s| ids.contains(&s.id)).collect();
    sort_by_name(&mut result);
    result
}
