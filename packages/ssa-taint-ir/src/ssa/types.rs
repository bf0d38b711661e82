//! The input SSA IR data model (§3 "SSA IR (input)").
//!
//! This crate never builds SSA; it consumes it. The shapes here are the
//! minimal closed set the core needs to pattern-match on (§9 "Dynamic
//! dispatch over instructions": "represent it as a tagged variant with one
//! case per opcode relevant to the analysis"). Any instruction kind outside
//! this set simply does not exist for a caller constructing the IR — C4/C6
//! still carry an `Other` catch-all so a caller-supplied oddity becomes a
//! one-line log instead of a panic (§7 "Unknown SSA instruction variant").

use std::sync::Arc;

/// Stable identity for an SSA value, unique within the owning [`Program`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ValueId(pub u32);

/// Stable identity for a single instruction occurrence (distinct from
/// [`ValueId`] because several instruction kinds — `Store`, `Jump`, `If`,
/// `Return`, ... — produce no value at all).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct InstrId(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FunctionId(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BlockId(pub u32);

/// Source position, used only for diagnostics and as a tie-break key
/// (§5 "Ordering guarantees").
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Position {
    pub file: Arc<str>,
    pub line: u32,
    pub column: u32,
}

impl std::fmt::Display for Position {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}:{}", self.file, self.line, self.column)
    }
}

/// Basic (non-aggregate) kinds. Only `String` and `UnsafePointer` are
/// reference-bearing among these (§4.C1 `may_share_object`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BasicKind {
    Bool,
    Int,
    Float,
    Complex,
    String,
    UnsafePointer,
    Invalid,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct StructField {
    pub name: Arc<str>,
    pub ty: Type,
}

/// The closed set of SSA types the core needs to classify reference-bearing
/// values and walk aggregate structure (§4.C1, §4.C8).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Type {
    Basic(BasicKind),
    Pointer(Box<Type>),
    Slice(Box<Type>),
    Array(Box<Type>, u64),
    Map { key: Box<Type>, value: Box<Type> },
    Chan(Box<Type>),
    Interface,
    Struct(Arc<[StructField]>),
    /// A named type wrapping an underlying type (`type Named Underlying`).
    Named { name: Arc<str>, underlying: Box<Type> },
    Signature,
    Tuple(Arc<[Type]>),
}

impl Type {
    /// §4.C1: classifies a type as reference-bearing (able to alias another
    /// value through pointers, slices, maps, etc).
    pub fn may_share_object(&self) -> bool {
        match self {
            Type::Basic(BasicKind::String) | Type::Basic(BasicKind::UnsafePointer) => true,
            Type::Basic(_) => false,
            Type::Pointer(_)
            | Type::Slice(_)
            | Type::Map { .. }
            | Type::Chan(_)
            | Type::Interface
            | Type::Struct(_)
            | Type::Array(..)
            | Type::Signature => true,
            Type::Named { underlying, .. } => underlying.may_share_object(),
            Type::Tuple(_) => false,
        }
    }

    /// §4.C1: true for everything reference-bearing except structs and
    /// arrays, which unify field-wise (`unify_by_value`) instead.
    pub fn is_unify_by_reference(&self) -> bool {
        match self {
            Type::Struct(_) | Type::Array(..) => false,
            Type::Named { underlying, .. } => underlying.is_unify_by_reference(),
            other => other.may_share_object(),
        }
    }

    /// §4.C1: true for structs, slices, arrays — types whose elements can be
    /// addressed with `FieldAddr`/`IndexAddr`.
    pub fn is_field_addressable(&self) -> bool {
        match self {
            Type::Struct(_) | Type::Slice(_) | Type::Array(..) => true,
            Type::Named { underlying, .. } => underlying.is_field_addressable(),
            _ => false,
        }
    }

    /// Peels named-type wrappers to the underlying type (used by C5's
    /// "Named, other: recurse on the underlying type").
    pub fn underlying(&self) -> &Type {
        match self {
            Type::Named { underlying, .. } => underlying.underlying(),
            other => other,
        }
    }

    /// §4.C6 `can_be_tainted_by_call`: pointer-like types, and aggregates
    /// that contain one, recursively.
    pub fn can_be_tainted_by_call(&self) -> bool {
        match self {
            Type::Pointer(_) | Type::Slice(_) | Type::Map { .. } | Type::Chan(_) | Type::Interface => true,
            Type::Basic(BasicKind::String) | Type::Basic(BasicKind::UnsafePointer) => true,
            Type::Basic(_) => false,
            Type::Struct(fields) => fields.iter().any(|f| f.ty.can_be_tainted_by_call()),
            Type::Array(elem, _) => elem.can_be_tainted_by_call(),
            Type::Named { underlying, .. } => underlying.can_be_tainted_by_call(),
            Type::Signature | Type::Tuple(_) => false,
        }
    }

    /// §4.C6: basic booleans and function signatures are not taintable.
    pub fn is_taintable(&self) -> bool {
        !matches!(self, Type::Basic(BasicKind::Bool) | Type::Signature)
    }
}

/// What an SSA [`Value`] is, independent of whether it is the result of an
/// instruction. `Const`/`Global`/`Parameter`/`FreeVar`/`Function`/`Builtin`
/// are leaf values with no defining instruction in any block (§4.C6's table
/// groups them together: "visit referrers? yes; operands: no").
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ValueKind {
    /// Produced by the instruction at the paired [`InstrId`].
    Instruction(InstrId),
    Const,
    Global,
    Parameter,
    FreeVar,
    Function(FunctionId),
    Builtin(Arc<str>),
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Value {
    pub id: ValueId,
    pub function: FunctionId,
    pub ty: Type,
    pub position: Option<Position>,
    pub kind: ValueKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CallKind {
    Call,
    Go,
    Defer,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Callee {
    /// Statically resolved to a function in the call graph.
    Static(FunctionId),
    /// Resolved only at the value level (closure, interface method, func
    /// value) — the call graph still supplies candidate targets for this
    /// site; this variant marks that the callee isn't known purely from the
    /// instruction's own fields.
    Dynamic(ValueId),
    /// A builtin by name (`append`, `copy`, `delete`, ...).
    Builtin(Arc<str>),
    /// A fully-qualified external function name, used to consult the
    /// library summary table (§4.C4.2, §4.C6 "External library summaries").
    External(Arc<str>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UnaryOp {
    /// `v = *addr` — load through a pointer.
    Deref,
    /// `v = <-ch` — channel receive.
    Recv,
    Neg,
    Not,
    Xor,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    And,
    Or,
    Xor,
    AndNot,
    Shl,
    Shr,
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

/// Either a compile-time-constant index/field (printed form retained
/// verbatim, e.g. `"3"` for a tuple/array index) or a non-constant index
/// that must be over-approximated via `AnyField` (§4.C4 `IndexAddr`/`Index`).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum IndexOperand {
    Const(Arc<str>),
    Dynamic(ValueId),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SelectDir {
    Send,
    Recv,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SelectState {
    pub dir: SelectDir,
    pub channel: ValueId,
    /// Present only for `Send` states.
    pub send_value: Option<ValueId>,
}

/// The source of an `Extract`'s tuple, needed to disambiguate the field
/// read performed in §4.C4's `Extract` handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TupleProducer {
    TypeAssertComma,
    MapRangeNext,
    LookupComma,
    RecvComma,
    Select,
    /// Anything else: treated as an aggregate with integer-named fields.
    Other,
}

/// One SSA instruction. Every producing variant carries its own `result`
/// field; non-producing variants (`Store`, `Jump`, `If`, `Return`, ...) do
/// not.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Instruction {
    Alloc { result: ValueId, elem_ty: Type, is_array: bool },
    FieldAddr { result: ValueId, x: ValueId, field: Arc<str> },
    Field { result: ValueId, x: ValueId, field: Arc<str> },
    IndexAddr { result: ValueId, x: ValueId, index: IndexOperand },
    Index { result: ValueId, x: ValueId, index: IndexOperand },
    /// `comma_ok = true` marks the two-result map-lookup form; the second
    /// result is consumed via a following `Extract`.
    Lookup { result: ValueId, map: ValueId, key: ValueId, comma_ok: bool },
    Store { addr: ValueId, value: ValueId },
    Phi { result: ValueId, incoming: Arc<[ValueId]> },
    MapUpdate { map: ValueId, key: ValueId, value: ValueId },
    Convert { result: ValueId, operand: ValueId },
    ChangeType { result: ValueId, operand: ValueId },
    ChangeInterface { result: ValueId, operand: ValueId },
    MakeInterface { result: ValueId, operand: ValueId },
    Slice { result: ValueId, x: ValueId, low: Option<ValueId>, high: Option<ValueId>, max: Option<ValueId> },
    /// `comma_ok = true` marks the two-result assert form.
    TypeAssert { result: ValueId, operand: ValueId, comma_ok: bool },
    UnOp { result: ValueId, op: UnaryOp, operand: ValueId },
    BinOp { result: ValueId, op: BinaryOp, x: ValueId, y: ValueId },
    Send { channel: ValueId, value: ValueId },
    MakeChan { result: ValueId, capacity: ValueId },
    MakeMap { result: ValueId },
    MakeSlice { result: ValueId },
    Range { result: ValueId, x: ValueId },
    /// `is_map` distinguishes map-range iteration from slice/string/chan.
    Next { result: ValueId, iter: ValueId, is_map: bool },
    Extract { result: ValueId, tuple: ValueId, index: u32, producer: TupleProducer },
    MakeClosure { result: ValueId, function: FunctionId, bindings: Arc<[ValueId]> },
    Call { result: Option<ValueId>, kind: CallKind, callee: Callee, args: Arc<[ValueId]>, signature_variadic: bool },
    Select { result: ValueId, states: Arc<[SelectState]>, blocking: bool },
    Return { values: Arc<[ValueId]> },
    Panic { value: ValueId },
    If { cond: ValueId },
    Jump,
    RunDefers,
    Builtin { result: Option<ValueId>, name: Arc<str>, args: Arc<[ValueId]> },
    DebugRef { value: ValueId },
    /// Anything the core doesn't otherwise model (§7, §9): logged once and
    /// treated as a no-op by both C4 and C6.
    Other,
}

impl Instruction {
    /// The value this instruction defines, if any.
    pub fn result(&self) -> Option<ValueId> {
        use Instruction::*;
        match self {
            Alloc { result, .. }
            | FieldAddr { result, .. }
            | Field { result, .. }
            | IndexAddr { result, .. }
            | Index { result, .. }
            | Lookup { result, .. }
            | Phi { result, .. }
            | Convert { result, .. }
            | ChangeType { result, .. }
            | ChangeInterface { result, .. }
            | MakeInterface { result, .. }
            | Slice { result, .. }
            | TypeAssert { result, .. }
            | UnOp { result, .. }
            | BinOp { result, .. }
            | MakeChan { result, .. }
            | MakeMap { result, .. }
            | MakeSlice { result, .. }
            | Range { result, .. }
            | Next { result, .. }
            | Extract { result, .. }
            | MakeClosure { result, .. }
            | Select { result, .. } => Some(*result),
            Call { result, .. } => *result,
            Builtin { result, .. } => *result,
            Store { .. }
            | MapUpdate { .. }
            | Send { .. }
            | Return { .. }
            | Panic { .. }
            | If { .. }
            | Jump
            | RunDefers
            | DebugRef { .. }
            | Other => None,
        }
    }

    /// Every `ValueId` this instruction reads, in no particular order.
    /// Used by C4/C6 for the generic fall-through cases and by C9's
    /// referrer scan.
    pub fn operands(&self) -> Vec<ValueId> {
        use Instruction::*;
        match self {
            Alloc { .. } | MakeMap { .. } | MakeSlice { .. } | Jump | RunDefers | Other => vec![],
            FieldAddr { x, .. } | Field { x, .. } => vec![*x],
            IndexAddr { x, index, .. } | Index { x, index, .. } => {
                let mut v = vec![*x];
                if let IndexOperand::Dynamic(i) = index {
                    v.push(*i);
                }
                v
            }
            Lookup { map, key, .. } => vec![*map, *key],
            Store { addr, value } => vec![*addr, *value],
            Phi { incoming, .. } => incoming.to_vec(),
            MapUpdate { map, key, value } => vec![*map, *key, *value],
            Convert { operand, .. }
            | ChangeType { operand, .. }
            | ChangeInterface { operand, .. }
            | MakeInterface { operand, .. }
            | TypeAssert { operand, .. }
            | UnOp { operand, .. }
            | DebugRef { value: operand } => vec![*operand],
            Slice { x, low, high, max, .. } => {
                let mut v = vec![*x];
                v.extend(low.iter().chain(high.iter()).chain(max.iter()).copied());
                v
            }
            BinOp { x, y, .. } => vec![*x, *y],
            Send { channel, value } => vec![*channel, *value],
            MakeChan { capacity, .. } => vec![*capacity],
            Range { x, .. } => vec![*x],
            Next { iter, .. } => vec![*iter],
            Extract { tuple, .. } => vec![*tuple],
            MakeClosure { bindings, .. } => bindings.to_vec(),
            Call { callee, args, .. } => {
                let mut v = args.to_vec();
                if let Callee::Dynamic(target) = callee {
                    v.push(*target);
                }
                v
            }
            Select { states, .. } => states
                .iter()
                .flat_map(|s| std::iter::once(s.channel).chain(s.send_value))
                .collect(),
            Return { values } => values.to_vec(),
            Panic { value } => vec![*value],
            If { cond } => vec![*cond],
            Builtin { args, .. } => args.to_vec(),
        }
    }
}

pub struct InstrSite {
    pub id: InstrId,
    pub position: Option<Position>,
    pub kind: Instruction,
}

pub struct BasicBlock {
    pub id: BlockId,
    pub function: FunctionId,
    pub instructions: Vec<InstrSite>,
    pub preds: Vec<BlockId>,
    pub succs: Vec<BlockId>,
}

pub struct Function {
    pub id: FunctionId,
    pub name: Arc<str>,
    pub params: Vec<ValueId>,
    pub free_vars: Vec<ValueId>,
    pub blocks: Vec<BasicBlock>,
    pub is_variadic: bool,
    /// Empty for external/undefined functions (§4.C4 "Failure semantics":
    /// `len(blocks) == 0` skips constraint generation silently).
    pub has_body: bool,
}

impl Function {
    pub fn block(&self, id: BlockId) -> Option<&BasicBlock> {
        self.blocks.iter().find(|b| b.id == id)
    }
}

/// The whole input program: every function plus a flat value table so any
/// `ValueId` can be resolved without threading a specific function through
/// every call.
pub struct Program {
    pub functions: Vec<Function>,
    pub values: std::collections::HashMap<ValueId, Value>,
}

impl Program {
    pub fn function(&self, id: FunctionId) -> Option<&Function> {
        self.functions.iter().find(|f| f.id == id)
    }

    pub fn value(&self, id: ValueId) -> Option<&Value> {
        self.values.get(&id)
    }

    /// Locates the instruction (and its containing block) that defines
    /// `value`, if `value`'s kind is [`ValueKind::Instruction`].
    pub fn defining_instr(&self, value: ValueId) -> Option<(&BasicBlock, &InstrSite)> {
        let v = self.values.get(&value)?;
        let ValueKind::Instruction(instr_id) = v.kind else {
            return None;
        };
        let func = self.function(v.function)?;
        for block in &func.blocks {
            if let Some(site) = block.instructions.iter().find(|s| s.id == instr_id) {
                return Some((block, site));
            }
        }
        None
    }
}
