//! Type objects and slot tables.
//!
//! A `TypeObject` is the frozen result of a protocol declaration: a name,
//! a `TypeId`, capability/policy flags, a `TypeSlots` dispatch table, and
//! a class dictionary of plain values and descriptors. Dispatch never
//! probes names at runtime; a capability exists exactly when its slot was
//! declared.
//!
//! # Slot Table Layout
//!
//! ```text
//! TypeObject
//! ├── name: InternedString
//! ├── type_id: TypeId
//! ├── flags: TypeFlags (self-cursor, comparison derivation policy)
//! ├── slots: TypeSlots (per-operation handler chains)
//! └── dict: ClassDict (plain attributes and descriptors)
//! ```
//!
//! Operator families (binary, reflected, in-place, unary, comparison)
//! hold *ordered chains* of handlers, tried in declaration order until
//! one produces a result other than `NotApplicable`. Structural
//! protocols (attributes, iteration, call, containers, scoped
//! resources) hold at most one handler each.

use crate::object::descriptor::Descriptor;
use rustc_hash::FxHashMap;
use smallvec::SmallVec;
use std::sync::Arc;
use tessera_core::{InternedString, ProtocolError, TypeId, Value};

// =============================================================================
// Handler Result
// =============================================================================

/// Outcome of invoking an operator handler.
///
/// `NotApplicable` is a distinct variant, never a sentinel `Value`: a
/// handler that produces the domain value none returns
/// `Handled(Value::None)`, which is final.
#[derive(Debug, Clone)]
pub enum HandlerResult {
    /// The handler produced a result; dispatch stops here.
    Handled(Value),
    /// The handler declined; dispatch continues down the fallback chain.
    NotApplicable,
}

impl HandlerResult {
    /// Check whether the handler produced a result.
    #[inline]
    pub fn is_handled(&self) -> bool {
        matches!(self, HandlerResult::Handled(_))
    }
}

impl From<Value> for HandlerResult {
    #[inline]
    fn from(value: Value) -> Self {
        HandlerResult::Handled(value)
    }
}

// =============================================================================
// Handler Signatures
// =============================================================================

/// Binary operator handler: `(primary, secondary)`.
pub type BinaryHandler =
    Arc<dyn Fn(&Value, &Value) -> Result<HandlerResult, ProtocolError> + Send + Sync>;

/// Unary operator handler.
pub type UnaryHandler = Arc<dyn Fn(&Value) -> Result<HandlerResult, ProtocolError> + Send + Sync>;

/// Attribute read handler (interceptor or fallback-on-missing).
pub type AttrReadHandler =
    Arc<dyn Fn(&Value, &str) -> Result<Value, ProtocolError> + Send + Sync>;

/// Attribute write handler.
pub type AttrWriteHandler =
    Arc<dyn Fn(&Value, &str, &Value) -> Result<(), ProtocolError> + Send + Sync>;

/// Attribute delete handler.
pub type AttrDeleteHandler =
    Arc<dyn Fn(&Value, &str) -> Result<(), ProtocolError> + Send + Sync>;

/// Cursor factory: produces the value that acts as the traversal cursor.
pub type CursorFactoryHandler =
    Arc<dyn Fn(&Value) -> Result<Value, ProtocolError> + Send + Sync>;

/// Cursor advancement: `Ok(Some(v))` yields, `Ok(None)` signals exhaustion.
pub type AdvanceHandler =
    Arc<dyn Fn(&Value) -> Result<Option<Value>, ProtocolError> + Send + Sync>;

/// Invocation handler: arguments pass through unchanged.
pub type CallHandler =
    Arc<dyn Fn(&Value, &[Value]) -> Result<Value, ProtocolError> + Send + Sync>;

/// Length handler.
pub type LenHandler = Arc<dyn Fn(&Value) -> Result<usize, ProtocolError> + Send + Sync>;

/// Indexing handler.
pub type ItemHandler = Arc<dyn Fn(&Value, i64) -> Result<Value, ProtocolError> + Send + Sync>;

/// Membership handler: `(container, query)`.
pub type ContainsHandler =
    Arc<dyn Fn(&Value, &Value) -> Result<bool, ProtocolError> + Send + Sync>;

/// Scoped-resource entry: acquires and returns the bound resource.
pub type EnterHandler = Arc<dyn Fn(&Value) -> Result<Value, ProtocolError> + Send + Sync>;

/// Scoped-resource exit: receives in-flight failure information and
/// decides suppression.
pub type ExitHandler =
    Arc<dyn Fn(&Value, Option<&ProtocolError>) -> Result<bool, ProtocolError> + Send + Sync>;

/// Ordered handler chain for one operation. Almost always one entry.
pub type HandlerChain<H> = SmallVec<[H; 1]>;

// =============================================================================
// Operator Vocabulary
// =============================================================================

/// Binary arithmetic operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    TrueDiv,
    FloorDiv,
    Mod,
    Pow,
}

impl BinaryOp {
    /// Number of binary operators (slot table width).
    pub const COUNT: usize = 7;

    /// Slot index.
    #[inline]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Source-level symbol, used in diagnostics.
    pub const fn symbol(self) -> &'static str {
        match self {
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::TrueDiv => "/",
            BinaryOp::FloorDiv => "//",
            BinaryOp::Mod => "%",
            BinaryOp::Pow => "**",
        }
    }

    /// Symbol for the in-place form.
    pub const fn inplace_symbol(self) -> &'static str {
        match self {
            BinaryOp::Add => "+=",
            BinaryOp::Sub => "-=",
            BinaryOp::Mul => "*=",
            BinaryOp::TrueDiv => "/=",
            BinaryOp::FloorDiv => "//=",
            BinaryOp::Mod => "%=",
            BinaryOp::Pow => "**=",
        }
    }
}

/// Unary arithmetic operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UnaryOp {
    Neg,
    Pos,
    Abs,
}

impl UnaryOp {
    /// Number of unary operators (slot table width).
    pub const COUNT: usize = 3;

    /// Slot index.
    #[inline]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Symbol used in diagnostics.
    pub const fn symbol(self) -> &'static str {
        match self {
            UnaryOp::Neg => "-",
            UnaryOp::Pos => "+",
            UnaryOp::Abs => "abs",
        }
    }
}

/// Comparison operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CompareOp {
    Lt,
    Le,
    Eq,
    Ne,
    Ge,
    Gt,
}

impl CompareOp {
    /// Number of comparison operators (slot table width).
    pub const COUNT: usize = 6;

    /// Slot index.
    #[inline]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Symbol used in diagnostics.
    pub const fn symbol(self) -> &'static str {
        match self {
            CompareOp::Lt => "<",
            CompareOp::Le => "<=",
            CompareOp::Eq => "==",
            CompareOp::Ne => "!=",
            CompareOp::Ge => ">=",
            CompareOp::Gt => ">",
        }
    }

    /// The operation the right-hand operand answers for this one.
    ///
    /// `a < b` reflects to `b > a`; equality and inequality reflect to
    /// themselves.
    pub const fn mirrored(self) -> CompareOp {
        match self {
            CompareOp::Lt => CompareOp::Gt,
            CompareOp::Le => CompareOp::Ge,
            CompareOp::Eq => CompareOp::Eq,
            CompareOp::Ne => CompareOp::Ne,
            CompareOp::Ge => CompareOp::Le,
            CompareOp::Gt => CompareOp::Lt,
        }
    }
}

// =============================================================================
// Type Flags
// =============================================================================

bitflags::bitflags! {
    /// Capability and policy flags fixed at type registration.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct TypeFlags: u32 {
        /// Obtaining a cursor returns the iterable itself.
        const SELF_CURSOR = 1 << 0;
        /// Derive `!=` by negating the resolved `==`.
        const DERIVE_NE_FROM_EQ = 1 << 1;
        /// Derive `>` and `>=` from `<` and `<=` with swapped operands.
        const DERIVE_ORDER_SWAP = 1 << 2;
    }
}

// =============================================================================
// Class Dictionary
// =============================================================================

/// A declared class attribute: a plain value or a descriptor.
///
/// The map keying guarantees an attribute name resolves to at most one
/// storage kind at lookup time.
#[derive(Clone)]
pub enum ClassAttr {
    /// A shared plain value.
    Plain(Value),
    /// A reusable attribute-behavior unit.
    Descriptor(Arc<dyn Descriptor>),
}

/// Class attribute dictionary.
///
/// Built once by the type builder and immutable thereafter, so lookups
/// take no lock.
#[derive(Default)]
pub struct ClassDict {
    attrs: FxHashMap<InternedString, ClassAttr>,
}

impl ClassDict {
    /// Construct from the builder's collected entries.
    pub(crate) fn from_entries(entries: FxHashMap<InternedString, ClassAttr>) -> Self {
        Self { attrs: entries }
    }

    /// Look up a declared attribute.
    #[inline]
    pub fn get(&self, name: &str) -> Option<&ClassAttr> {
        self.attrs.get(name)
    }

    /// Check whether an attribute is declared.
    #[inline]
    pub fn contains(&self, name: &str) -> bool {
        self.attrs.contains_key(name)
    }

    /// Number of declared attributes.
    pub fn len(&self) -> usize {
        self.attrs.len()
    }

    /// Check if empty.
    pub fn is_empty(&self) -> bool {
        self.attrs.is_empty()
    }
}

// =============================================================================
// Type Slots
// =============================================================================

/// Per-operation dispatch table for one type.
///
/// Populated by `TypeBuilder` and frozen when the owning `TypeObject`
/// is registered.
#[derive(Default)]
pub struct TypeSlots {
    /// Forward binary operator chains.
    pub(crate) binary: [HandlerChain<BinaryHandler>; BinaryOp::COUNT],
    /// Reflected (right-hand) binary operator chains.
    pub(crate) reflected: [HandlerChain<BinaryHandler>; BinaryOp::COUNT],
    /// In-place binary operator chains.
    pub(crate) inplace: [HandlerChain<BinaryHandler>; BinaryOp::COUNT],
    /// Unary operator chains.
    pub(crate) unary: [HandlerChain<UnaryHandler>; UnaryOp::COUNT],
    /// Comparison chains.
    pub(crate) compare: [HandlerChain<BinaryHandler>; CompareOp::COUNT],

    /// Attribute read interceptor (mandatory gate when declared).
    pub(crate) attr_read: Option<AttrReadHandler>,
    /// Fallback-on-missing read handler.
    pub(crate) attr_fallback: Option<AttrReadHandler>,
    /// Attribute write handler.
    pub(crate) attr_write: Option<AttrWriteHandler>,
    /// Attribute delete handler.
    pub(crate) attr_delete: Option<AttrDeleteHandler>,

    /// Cursor factory ("obtain cursor").
    pub(crate) cursor_factory: Option<CursorFactoryHandler>,
    /// Cursor advancement ("advance cursor").
    pub(crate) advance: Option<AdvanceHandler>,

    /// Invocation handler.
    pub(crate) call: Option<CallHandler>,

    /// Container length.
    pub(crate) len: Option<LenHandler>,
    /// Container indexing.
    pub(crate) item: Option<ItemHandler>,
    /// Container membership.
    pub(crate) contains: Option<ContainsHandler>,
    /// Bespoke reversal (cursor factory over the reversed sequence).
    pub(crate) reversed: Option<CursorFactoryHandler>,

    /// Scoped-resource entry.
    pub(crate) enter: Option<EnterHandler>,
    /// Scoped-resource exit.
    pub(crate) exit: Option<ExitHandler>,
}

impl TypeSlots {
    /// Forward chain for a binary operator.
    #[inline]
    pub fn binary_chain(&self, op: BinaryOp) -> &[BinaryHandler] {
        &self.binary[op.index()]
    }

    /// Reflected chain for a binary operator.
    #[inline]
    pub fn reflected_chain(&self, op: BinaryOp) -> &[BinaryHandler] {
        &self.reflected[op.index()]
    }

    /// In-place chain for a binary operator.
    #[inline]
    pub fn inplace_chain(&self, op: BinaryOp) -> &[BinaryHandler] {
        &self.inplace[op.index()]
    }

    /// Chain for a unary operator.
    #[inline]
    pub fn unary_chain(&self, op: UnaryOp) -> &[UnaryHandler] {
        &self.unary[op.index()]
    }

    /// Chain for a comparison operator.
    #[inline]
    pub fn compare_chain(&self, op: CompareOp) -> &[BinaryHandler] {
        &self.compare[op.index()]
    }

    /// Attribute read interceptor, if declared.
    #[inline]
    pub fn attr_read(&self) -> Option<&AttrReadHandler> {
        self.attr_read.as_ref()
    }

    /// Fallback-on-missing read handler, if declared.
    #[inline]
    pub fn attr_fallback(&self) -> Option<&AttrReadHandler> {
        self.attr_fallback.as_ref()
    }

    /// Attribute write handler, if declared.
    #[inline]
    pub fn attr_write(&self) -> Option<&AttrWriteHandler> {
        self.attr_write.as_ref()
    }

    /// Attribute delete handler, if declared.
    #[inline]
    pub fn attr_delete(&self) -> Option<&AttrDeleteHandler> {
        self.attr_delete.as_ref()
    }

    /// Cursor factory, if declared.
    #[inline]
    pub fn cursor_factory(&self) -> Option<&CursorFactoryHandler> {
        self.cursor_factory.as_ref()
    }

    /// Cursor advancement, if declared.
    #[inline]
    pub fn advance(&self) -> Option<&AdvanceHandler> {
        self.advance.as_ref()
    }

    /// Invocation handler, if declared.
    #[inline]
    pub fn call(&self) -> Option<&CallHandler> {
        self.call.as_ref()
    }

    /// Length handler, if declared.
    #[inline]
    pub fn length(&self) -> Option<&LenHandler> {
        self.len.as_ref()
    }

    /// Indexing handler, if declared.
    #[inline]
    pub fn item(&self) -> Option<&ItemHandler> {
        self.item.as_ref()
    }

    /// Membership handler, if declared.
    #[inline]
    pub fn contains(&self) -> Option<&ContainsHandler> {
        self.contains.as_ref()
    }

    /// Bespoke reversal, if declared.
    #[inline]
    pub fn reversed(&self) -> Option<&CursorFactoryHandler> {
        self.reversed.as_ref()
    }

    /// Scoped-resource entry, if declared.
    #[inline]
    pub fn enter(&self) -> Option<&EnterHandler> {
        self.enter.as_ref()
    }

    /// Scoped-resource exit, if declared.
    #[inline]
    pub fn exit(&self) -> Option<&ExitHandler> {
        self.exit.as_ref()
    }
}

// =============================================================================
// Type Object
// =============================================================================

/// A registered type: the frozen result of a protocol declaration.
///
/// # Thread Safety
///
/// Immutable after registration; shared freely behind `Arc`. Dispatch
/// resolves against whatever `Arc` snapshot it fetched, so later
/// registrations are invisible to in-flight operations.
pub struct TypeObject {
    name: InternedString,
    type_id: TypeId,
    flags: TypeFlags,
    slots: TypeSlots,
    dict: ClassDict,
}

impl TypeObject {
    /// Assemble a type object. Only the builder constructs these.
    pub(crate) fn assemble(
        name: InternedString,
        type_id: TypeId,
        flags: TypeFlags,
        slots: TypeSlots,
        dict: ClassDict,
    ) -> Self {
        Self {
            name,
            type_id,
            flags,
            slots,
            dict,
        }
    }

    /// Type name.
    #[inline]
    pub fn name(&self) -> &InternedString {
        &self.name
    }

    /// Type id.
    #[inline]
    pub fn type_id(&self) -> TypeId {
        self.type_id
    }

    /// Capability and policy flags.
    #[inline]
    pub fn flags(&self) -> TypeFlags {
        self.flags
    }

    /// Slot table.
    #[inline]
    pub fn slots(&self) -> &TypeSlots {
        &self.slots
    }

    /// Class dictionary.
    #[inline]
    pub fn dict(&self) -> &ClassDict {
        &self.dict
    }
}

impl std::fmt::Debug for TypeObject {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TypeObject")
            .field("name", &self.name)
            .field("type_id", &self.type_id)
            .field("flags", &self.flags)
            .finish_non_exhaustive()
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_op_symbols() {
        assert_eq!(BinaryOp::Add.symbol(), "+");
        assert_eq!(BinaryOp::Pow.symbol(), "**");
        assert_eq!(BinaryOp::Add.inplace_symbol(), "+=");
        assert_eq!(UnaryOp::Neg.symbol(), "-");
        assert_eq!(CompareOp::Ge.symbol(), ">=");
    }

    #[test]
    fn test_compare_mirroring() {
        assert_eq!(CompareOp::Lt.mirrored(), CompareOp::Gt);
        assert_eq!(CompareOp::Le.mirrored(), CompareOp::Ge);
        assert_eq!(CompareOp::Gt.mirrored(), CompareOp::Lt);
        assert_eq!(CompareOp::Eq.mirrored(), CompareOp::Eq);
        assert_eq!(CompareOp::Ne.mirrored(), CompareOp::Ne);
    }

    #[test]
    fn test_slot_indices_are_dense() {
        assert!(BinaryOp::Pow.index() < BinaryOp::COUNT);
        assert!(UnaryOp::Abs.index() < UnaryOp::COUNT);
        assert!(CompareOp::Gt.index() < CompareOp::COUNT);
    }

    #[test]
    fn test_default_slots_declare_nothing() {
        let slots = TypeSlots::default();
        assert!(slots.binary_chain(BinaryOp::Add).is_empty());
        assert!(slots.compare_chain(CompareOp::Eq).is_empty());
        assert!(slots.attr_read().is_none());
        assert!(slots.call().is_none());
        assert!(slots.enter().is_none());
    }

    #[test]
    fn test_handler_result_from_value() {
        let r: HandlerResult = Value::int(1).into();
        assert!(r.is_handled());
        assert!(!matches!(HandlerResult::NotApplicable, HandlerResult::Handled(_)));
    }
}
