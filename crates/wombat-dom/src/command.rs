//! Host command log.
//!
//! The rendering side of the host framework mirrors the native tree. Every
//! native mutation appends one [`UiCommand`], keyed by target id, which the
//! host drains and applies in order.

use serde::{Deserialize, Serialize};

/// Opaque node identity shared with the host framework.
pub type TargetId = i64;

/// Target id of the document.
pub const DOCUMENT_TARGET_ID: TargetId = 0;

/// Target id reserved for the document's body element.
///
/// Script-level construction never allocates it.
pub const BODY_TARGET_ID: TargetId = -1;

/// First target id handed out to script-created nodes.
pub const FIRST_TARGET_ID: TargetId = 1;

/// One mutation to replay on the host side.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum UiCommand {
    /// An element was constructed.
    CreateElement {
        /// The new node
        target_id: TargetId,
        /// Tag name as given by script
        tag_name: String,
    },
    /// A text node was constructed.
    CreateTextNode {
        /// The new node
        target_id: TargetId,
        /// Initial data
        data: String,
    },
    /// A comment was constructed.
    CreateComment {
        /// The new node
        target_id: TargetId,
        /// Initial data
        data: String,
    },
    /// `child` was inserted into `parent`, before `before` or at the end.
    InsertChild {
        /// New parent
        parent: TargetId,
        /// Inserted node
        child: TargetId,
        /// Following sibling, `None` to append
        before: Option<TargetId>,
    },
    /// `child` was detached from `parent`.
    RemoveChild {
        /// Old parent
        parent: TargetId,
        /// Detached node
        child: TargetId,
    },
    /// Character data changed.
    SetData {
        /// The text or comment node
        target_id: TargetId,
        /// New data
        data: String,
    },
}
