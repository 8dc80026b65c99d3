//! Flow Elements
//!
//! This module defines the element records that live in the flow store.
//!
//! Elements refer to each other only by [`ElementId`]. The store owns every
//! record; links are plain data, so the shared references a flow needs
//! (branch heads pointing back at their parent, merge elements reached from
//! several branches) never turn into shared ownership.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize, Serializer};
use smallvec::{smallvec, SmallVec};

use crate::error::{FlowError, Result};

/// Raw child index marking the head of a fault chain.
pub const FAULT_INDEX: i32 = -1;

/// Largest branch count whose slots all have a raw child index.
pub const MAX_ARITY: usize = i32::MAX as usize;

/// Unique identifier for an element in the flow store.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ElementId(String);

impl ElementId {
    /// Wrap an identifier handed out by the element factory.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Mint a new process-unique identifier.
    pub fn generate() -> Self {
        static COUNTER: AtomicU64 = AtomicU64::new(0);
        Self(format!("element-{}", COUNTER.fetch_add(1, Ordering::Relaxed)))
    }

    /// Get the raw identifier.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ElementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ElementId {
    fn from(id: &str) -> Self {
        Self(id.to_owned())
    }
}

impl From<String> for ElementId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// Where a head element hangs off its parent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(try_from = "i32")]
pub enum ChildIndex {
    /// One of the parent's ordinary branch slots.
    Branch(usize),
    /// The parent's fault slot.
    Fault,
}

impl ChildIndex {
    /// Check whether this addresses the fault slot.
    pub fn is_fault(&self) -> bool {
        matches!(self, Self::Fault)
    }
}

impl TryFrom<ChildIndex> for i32 {
    type Error = FlowError;

    fn try_from(index: ChildIndex) -> Result<Self> {
        match index {
            ChildIndex::Fault => Ok(FAULT_INDEX),
            ChildIndex::Branch(slot) => {
                i32::try_from(slot).map_err(|_| FlowError::UnrepresentableSlot(slot))
            }
        }
    }
}

impl Serialize for ChildIndex {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let raw = i32::try_from(*self).map_err(serde::ser::Error::custom)?;
        serializer.serialize_i32(raw)
    }
}

impl TryFrom<i32> for ChildIndex {
    type Error = FlowError;

    fn try_from(raw: i32) -> Result<Self> {
        match raw {
            FAULT_INDEX => Ok(Self::Fault),
            slot if slot >= 0 => Ok(Self::Branch(slot as usize)),
            other => Err(FlowError::InvalidChildIndex(other)),
        }
    }
}

impl fmt::Display for ChildIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Branch(slot) => write!(f, "branch {slot}"),
            Self::Fault => f.write_str("fault"),
        }
    }
}

/// The kind of element on the canvas, as far as graph shape is concerned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ElementKind {
    /// A plain sequential step.
    Step,

    /// An element whose outgoing paths split into a fixed number of branches
    /// (decisions, loops, wait events).
    Branching { arity: usize },

    /// An element with exactly one outgoing path and no branch support.
    PassThrough,
}

/// Branch slots of a branching element. Most have only a handful.
pub type Slots = SmallVec<[Option<ElementId>; 4]>;

/// An element in the flow graph.
///
/// Deserialized records are checked against their kind the same way
/// [`Element::branching`] checks its arguments.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "ElementRecord")]
pub struct Element {
    /// Unique identifier, stable for the element's lifetime.
    pub(crate) id: ElementId,

    /// Shape-relevant kind.
    pub(crate) kind: ElementKind,

    /// Previous element in the same chain. Always absent on heads.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub(crate) prev: Option<ElementId>,

    /// Next element in the same chain.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub(crate) next: Option<ElementId>,

    /// The element this one is the branch or fault head of.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub(crate) parent: Option<ElementId>,

    /// Which of the parent's slots this head occupies.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub(crate) child_index: Option<ChildIndex>,

    /// Whether the chain this element heads dead-ends instead of merging.
    #[serde(default)]
    pub(crate) is_terminal: bool,

    /// Branch heads, one slot per branch. Empty unless branching.
    #[serde(default, skip_serializing_if = "SmallVec::is_empty")]
    pub(crate) children: Slots,

    /// Whether this element carries a fault slot at all.
    #[serde(default)]
    pub(crate) supports_fault: bool,

    /// Head of the fault chain.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub(crate) fault: Option<ElementId>,

    /// Canvas selection flag.
    #[serde(default)]
    pub(crate) is_selected: bool,
}

/// Wire form of [`Element`], before its shape has been checked.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ElementRecord {
    id: ElementId,
    kind: ElementKind,
    #[serde(default)]
    prev: Option<ElementId>,
    #[serde(default)]
    next: Option<ElementId>,
    #[serde(default)]
    parent: Option<ElementId>,
    #[serde(default)]
    child_index: Option<ChildIndex>,
    #[serde(default)]
    is_terminal: bool,
    #[serde(default)]
    children: Slots,
    #[serde(default)]
    supports_fault: bool,
    #[serde(default)]
    fault: Option<ElementId>,
    #[serde(default)]
    is_selected: bool,
}

impl TryFrom<ElementRecord> for Element {
    type Error = FlowError;

    fn try_from(record: ElementRecord) -> Result<Self> {
        let arity = match record.kind {
            ElementKind::Branching { arity } => check_arity(arity)?,
            ElementKind::Step | ElementKind::PassThrough => 0,
        };
        if record.children.len() != arity {
            return Err(FlowError::SlotCountMismatch {
                element: record.id,
                arity,
                slots: record.children.len(),
            });
        }
        if record.fault.is_some() && !record.supports_fault {
            return Err(FlowError::FaultUnsupported(record.id));
        }

        Ok(Self {
            id: record.id,
            kind: record.kind,
            prev: record.prev,
            next: record.next,
            parent: record.parent,
            child_index: record.child_index,
            is_terminal: record.is_terminal,
            children: record.children,
            supports_fault: record.supports_fault,
            fault: record.fault,
            is_selected: record.is_selected,
        })
    }
}

fn check_arity(arity: usize) -> Result<usize> {
    if (2..=MAX_ARITY).contains(&arity) {
        Ok(arity)
    } else {
        Err(FlowError::InvalidArity(arity))
    }
}

impl Element {
    fn new(id: ElementId, kind: ElementKind, children: Slots) -> Self {
        Self {
            id,
            kind,
            prev: None,
            next: None,
            parent: None,
            child_index: None,
            is_terminal: false,
            children,
            supports_fault: false,
            fault: None,
            is_selected: false,
        }
    }

    /// Create a plain sequential element.
    pub fn step(id: impl Into<ElementId>) -> Self {
        Self::new(id.into(), ElementKind::Step, SmallVec::new())
    }

    /// Create a pass-through element.
    pub fn pass_through(id: impl Into<ElementId>) -> Self {
        Self::new(id.into(), ElementKind::PassThrough, SmallVec::new())
    }

    /// Create a branching element with `arity` empty branches.
    pub fn branching(id: impl Into<ElementId>, arity: usize) -> Result<Self> {
        let arity = check_arity(arity)?;
        Ok(Self::new(
            id.into(),
            ElementKind::Branching { arity },
            smallvec![None; arity],
        ))
    }

    /// Give this element an (empty) fault slot.
    pub fn with_fault_support(mut self) -> Self {
        self.supports_fault = true;
        self
    }

    /// Name the element this one should be linked after.
    pub fn with_prev(mut self, prev: impl Into<ElementId>) -> Self {
        self.prev = Some(prev.into());
        self
    }

    /// Name the element this one should be linked before.
    pub fn with_next(mut self, next: impl Into<ElementId>) -> Self {
        self.next = Some(next.into());
        self
    }

    pub fn id(&self) -> &ElementId {
        &self.id
    }

    pub fn kind(&self) -> ElementKind {
        self.kind
    }

    pub fn prev(&self) -> Option<&ElementId> {
        self.prev.as_ref()
    }

    pub fn next(&self) -> Option<&ElementId> {
        self.next.as_ref()
    }

    pub fn parent(&self) -> Option<&ElementId> {
        self.parent.as_ref()
    }

    pub fn child_index(&self) -> Option<ChildIndex> {
        self.child_index
    }

    pub fn is_terminal(&self) -> bool {
        self.is_terminal
    }

    /// Branch head slots. Empty for non-branching elements.
    pub fn children(&self) -> &[Option<ElementId>] {
        &self.children
    }

    pub fn fault(&self) -> Option<&ElementId> {
        self.fault.as_ref()
    }

    pub fn supports_fault(&self) -> bool {
        self.supports_fault
    }

    pub fn is_selected(&self) -> bool {
        self.is_selected
    }

    /// Check if this element splits into branches.
    pub fn is_branching(&self) -> bool {
        matches!(self.kind, ElementKind::Branching { .. })
    }

    /// Check if this element heads a branch or fault chain.
    pub fn is_head(&self) -> bool {
        self.parent.is_some()
    }

    /// Check if this element is the start of the whole flow.
    pub fn is_root(&self) -> bool {
        self.prev.is_none() && self.parent.is_none()
    }

    /// Number of branch slots.
    pub fn arity(&self) -> usize {
        self.children.len()
    }

    /// Check if the element has any linkage a linker would overwrite.
    pub(crate) fn has_head_linkage(&self) -> bool {
        self.parent.is_some() || self.child_index.is_some()
    }

    /// Get the occupant of one of this element's slots.
    pub fn slot(&self, index: ChildIndex) -> Result<Option<&ElementId>> {
        match index {
            ChildIndex::Fault if self.supports_fault => Ok(self.fault.as_ref()),
            ChildIndex::Branch(slot) if slot < self.children.len() => {
                Ok(self.children[slot].as_ref())
            }
            ChildIndex::Branch(_) if !self.is_branching() => {
                Err(FlowError::NotBranching(self.id.clone()))
            }
            _ => Err(FlowError::slot_out_of_range(&self.id, index, self.arity())),
        }
    }

    pub(crate) fn slot_mut(&mut self, index: ChildIndex) -> Result<&mut Option<ElementId>> {
        match index {
            ChildIndex::Fault if self.supports_fault => Ok(&mut self.fault),
            ChildIndex::Branch(slot) if slot < self.children.len() => {
                Ok(&mut self.children[slot])
            }
            ChildIndex::Branch(_) if !self.is_branching() => {
                Err(FlowError::NotBranching(self.id.clone()))
            }
            _ => Err(FlowError::slot_out_of_range(&self.id, index, self.children.len())),
        }
    }

    /// Turn this element into the head of `parent`'s `index` slot.
    pub(crate) fn make_head(&mut self, parent: ElementId, index: ChildIndex, is_terminal: bool) {
        self.prev = None;
        self.parent = Some(parent);
        self.child_index = Some(index);
        self.is_terminal = is_terminal;
    }

    /// Strip head linkage, turning this element into a plain chain member.
    pub(crate) fn clear_head(&mut self) {
        self.parent = None;
        self.child_index = None;
        self.is_terminal = false;
    }
}
