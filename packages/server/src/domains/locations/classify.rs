//! Where a geocoded place hangs in the tree.

use super::models::ROOT_LOCATION;
use crate::kernel::{Place, PlaceKind};

/// Name of the parent `name` should be attached under, or `None` when the
/// place can't be placed (unsupported kind or a missing address field).
///
/// Checked in order: a country hangs under the root, a state under its
/// country, a settlement under its state, a university under its city.
pub fn parent_for(name: &str, place: &Place) -> Option<String> {
    match place.kind {
        PlaceKind::Administrative => {
            if place.country.as_deref() == Some(name) {
                Some(ROOT_LOCATION.to_string())
            } else if place.state.as_deref() == Some(name) {
                place.country.clone()
            } else {
                None
            }
        }
        PlaceKind::City | PlaceKind::Village | PlaceKind::Town => place.state.clone(),
        PlaceKind::University => place.city.clone(),
        PlaceKind::Other(_) => None,
    }
}
