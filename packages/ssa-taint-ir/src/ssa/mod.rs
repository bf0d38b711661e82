//! Input SSA IR data model (§3). Everything under this module is consumed,
//! never constructed by an analysis pass — see the crate root for the
//! boundary between "input" and "the core".

pub mod callgraph;
pub mod dominance;
pub mod qualname;
pub mod types;

pub use callgraph::{CallEdge, CallGraph, PetgraphCallGraph};
pub use dominance::{block_reachable, DominatorTree};
pub use qualname::{split_call_name, split_type_name, struct_parts};
pub use types::{
    BasicBlock, BasicKind, BinaryOp, BlockId, CallKind, Callee, Function, FunctionId,
    IndexOperand, Instruction, InstrId, InstrSite, Position, Program, SelectDir, SelectState,
    StructField, TupleProducer, Type, UnaryOp, Value, ValueId, ValueKind,
};
