//! Selection recalculation after a session is removed.
//!
//! The rules, in order:
//!
//! 1. A removal that did not hit the selected session only shifts the
//!    pointer.
//! 2. When asked, the removed session's parent is preferred, unless the
//!    parent is a custom tab.
//! 3. Otherwise the nearest remaining session sharing the removed
//!    session's privacy flag wins, probing the lower index before the
//!    higher one at each distance.
//! 4. Losing the last private session may surface a regular one; losing
//!    the last regular session never surfaces a private one. Private state
//!    must not be selected automatically.

use crate::Session;
use crate::error::{Error, Result};

/// Computes the new selection index against the post-removal `values`.
///
/// `removed_index` is the position the removed session used to occupy.
/// Returns the index of the newly selected session, or `None` for no
/// selection. Fails with [`Error::InternalConsistency`] when a recorded
/// parent id cannot be resolved, which indicates a prior invariant
/// violation elsewhere.
pub(super) fn recalculate(
	values: &[Session],
	selected_index: Option<usize>,
	removed_index: usize,
	removed: &Session,
	select_parent_if_exists: bool,
) -> Result<Option<usize>> {
	let Some(selected) = selected_index else {
		return Ok(None);
	};

	if removed_index != selected {
		// Only the pointer shifts; the selected session itself survived.
		let shifted = if removed_index < selected { selected - 1 } else { selected };
		return Ok(Some(shifted));
	}

	if values.is_empty() {
		return Ok(None);
	}

	if select_parent_if_exists {
		if let Some(parent_id) = removed.parent_id() {
			let parent_index = values
				.iter()
				.position(|session| session.id() == parent_id)
				.ok_or_else(|| {
					Error::InternalConsistency(format!(
						"parent session referenced by id does not exist: {parent_id}"
					))
				})?;

			if !values[parent_index].is_custom_tab() {
				return Ok(Some(parent_index));
			}

			// Custom tabs are never selected; search near the removed
			// position instead.
			return Ok(search_from(values, removed_index, removed));
		}
	}

	// The old pointer, pulled back in bounds if the removal was at the end.
	let anchor = if selected == values.len() { selected - 1 } else { selected };

	let candidate = &values[anchor];
	if !candidate.is_custom_tab() && candidate.is_private() == removed.is_private() {
		return Ok(Some(anchor));
	}

	Ok(search_from(values, anchor, removed))
}

fn search_from(values: &[Session], anchor: usize, removed: &Session) -> Option<usize> {
	let same_privacy = find_nearby(values, anchor, |session| {
		!session.is_custom_tab() && session.is_private() == removed.is_private()
	});
	if same_privacy.is_some() {
		return same_privacy;
	}

	// Fallback across the privacy boundary is one-directional.
	if removed.is_private() {
		return find_nearby(values, anchor, |session| !session.is_custom_tab());
	}

	None
}

/// Nearest index around `anchor` satisfying `predicate`, oscillating
/// outward. The anchor itself is never considered.
fn find_nearby(values: &[Session], anchor: usize, predicate: impl Fn(&Session) -> bool) -> Option<usize> {
	if values.is_empty() {
		return None;
	}

	let last = values.len() - 1;
	let max_steps = anchor.max(last.saturating_sub(anchor));

	for steps in 1..=max_steps {
		let below = anchor.checked_sub(steps);
		let above = anchor + steps;

		if let Some(index) = below {
			if predicate(&values[index]) {
				return Some(index);
			}
		}
		if above <= last && predicate(&values[above]) {
			return Some(above);
		}
	}

	None
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::CustomTabConfig;

	fn regular(url: &str) -> Session {
		Session::new(url)
	}

	fn private(url: &str) -> Session {
		Session::new(url).with_private(true)
	}

	fn custom(url: &str) -> Session {
		Session::new(url).with_custom_tab_config(CustomTabConfig::default())
	}

	#[test]
	fn removal_of_unselected_session_shifts_pointer() {
		let values = vec![regular("a"), regular("b"), regular("c")];

		let shifted = recalculate(&values, Some(2), 0, &regular("removed"), false).unwrap();
		assert_eq!(shifted, Some(1));

		let unchanged = recalculate(&values, Some(1), 2, &regular("removed"), false).unwrap();
		assert_eq!(unchanged, Some(1));
	}

	#[test]
	fn no_prior_selection_stays_none() {
		let values = vec![regular("a")];
		let result = recalculate(&values, None, 0, &regular("removed"), false).unwrap();
		assert_eq!(result, None);
	}

	#[test]
	fn removing_last_session_clears_selection() {
		let result = recalculate(&[], Some(0), 0, &regular("removed"), false).unwrap();
		assert_eq!(result, None);
	}

	#[test]
	fn end_removal_falls_back_to_previous_index() {
		let values = vec![regular("a"), regular("b"), regular("c")];
		let result = recalculate(&values, Some(3), 3, &regular("removed"), false).unwrap();
		assert_eq!(result, Some(2));
	}

	#[test]
	fn nearest_search_prefers_matching_privacy() {
		// Post-removal list after dropping a private session at index 3.
		let values = vec![private("p1"), regular("r1"), regular("r2"), private("p3")];
		let removed = private("p2");
		let result = recalculate(&values, Some(3), 3, &removed, false).unwrap();
		assert_eq!(result, Some(3));
	}

	#[test]
	fn last_private_removal_may_select_regular() {
		let values = vec![regular("r1"), regular("r2")];
		let removed = private("p1");
		let result = recalculate(&values, Some(0), 0, &removed, false).unwrap();
		// The anchor stays at index 0 but has the wrong privacy; the
		// oscillating search starts at distance one, landing on r2.
		assert_eq!(result, Some(1));
	}

	#[test]
	fn last_regular_removal_never_selects_private() {
		let values = vec![private("p1")];
		let removed = regular("r1");
		let result = recalculate(&values, Some(1), 1, &removed, false).unwrap();
		assert_eq!(result, None);
	}

	#[test]
	fn parent_is_selected_when_requested() {
		let parent = regular("parent");
		let parent_id = parent.id().to_string();
		let values = vec![parent, regular("other")];

		let mut removed = regular("child");
		removed.set_parent_id(Some(parent_id));

		let result = recalculate(&values, Some(1), 1, &removed, true).unwrap();
		assert_eq!(result, Some(0));
	}

	#[test]
	fn custom_tab_parent_is_skipped_for_nearby_search() {
		let parent = custom("parent");
		let parent_id = parent.id().to_string();
		let values = vec![parent, regular("other")];

		let mut removed = regular("child");
		removed.set_parent_id(Some(parent_id));

		// Anchored at the removed position (1): distance one probes
		// index 0 (custom, skipped) and index 2 (out of bounds).
		let result = recalculate(&values, Some(1), 1, &removed, true).unwrap();
		assert_eq!(result, None);
	}

	#[test]
	fn missing_parent_is_an_internal_consistency_error() {
		let values = vec![regular("other")];
		let mut removed = regular("child");
		removed.set_parent_id(Some("gone".to_string()));

		let result = recalculate(&values, Some(0), 0, &removed, true);
		assert!(matches!(result, Err(Error::InternalConsistency(_))));
	}

	#[test]
	fn custom_tabs_are_skipped_by_the_nearest_search() {
		let values = vec![regular("r1"), custom("ct"), regular("r2")];
		let removed = regular("removed");
		// Anchor lands on the custom tab; search resolves to index 0.
		let result = recalculate(&values, Some(1), 1, &removed, false).unwrap();
		assert_eq!(result, Some(0));
	}
}
