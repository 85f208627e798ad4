//! Ownership checks.
//!
//! A list is reachable by a user only through an `users_lists` row; an item only
//! through `lists_items` and then `users_lists`. The functions below express those
//! paths over plain relation rows and are what `MemoryStore` filters with. The
//! PostgreSQL store expresses the same paths as joins, see the `*_JOIN` constants.

/// Entity table names, also used to label write events.
pub const USERS_TABLE: &str = "users";
pub const TODO_LISTS_TABLE: &str = "todo_lists";
pub const TODO_ITEMS_TABLE: &str = "todo_items";

/// `todo_lists tl` reached from `users_lists ul`.
pub const LIST_OWNER_JOIN: &str = "INNER JOIN users_lists ul ON tl.id = ul.list_id";

/// `todo_items ti` reached from `lists_items li` and `users_lists ul`.
pub const ITEM_OWNER_JOIN: &str = "INNER JOIN lists_items li ON ti.id = li.item_id \
     INNER JOIN users_lists ul ON ul.list_id = li.list_id";

/// A `users_lists` row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ownership {
    pub user_id: i32,
    pub list_id: i32,
}

/// A `lists_items` row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Membership {
    pub list_id: i32,
    pub item_id: i32,
}

pub fn can_access_list(owners: &[Ownership], user_id: i32, list_id: i32) -> bool {
    owners
        .iter()
        .any(|o| o.user_id == user_id && o.list_id == list_id)
}

pub fn can_access_item(
    owners: &[Ownership],
    members: &[Membership],
    user_id: i32,
    item_id: i32,
) -> bool {
    members
        .iter()
        .filter(|m| m.item_id == item_id)
        .any(|m| can_access_list(owners, user_id, m.list_id))
}

/// Ids of every list the user owns, in relation insertion order.
pub fn lists_of(owners: &[Ownership], user_id: i32) -> Vec<i32> {
    owners
        .iter()
        .filter(|o| o.user_id == user_id)
        .map(|o| o.list_id)
        .collect()
}

/// Ids of the items in `list_id`, or nothing if the user does not own the list.
pub fn items_in_list(
    owners: &[Ownership],
    members: &[Membership],
    user_id: i32,
    list_id: i32,
) -> Vec<i32> {
    if !can_access_list(owners, user_id, list_id) {
        return Vec::new();
    }
    members
        .iter()
        .filter(|m| m.list_id == list_id)
        .map(|m| m.item_id)
        .collect()
}
