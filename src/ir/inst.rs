// Copyright (c) 2017-2021 Fabian Schuiki

//! Representation of SSIR instructions.
//!
//! This module implements the various instructions of the intermediate
//! representation.

use crate::{
    ir::{Block, ExtFunc, FunctionBuilder, Inst, Value},
    ty::{int_ty, pointer_ty, void_ty, Type},
};

/// An instruction opcode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Opcode {
    Add,
    Sub,
    Mul,
    Udiv,
    Sdiv,
    Urem,
    Srem,

    Fneg,
    Fadd,
    Fsub,
    Fmul,
    Fdiv,
    Frem,

    Shl,
    Lshr,
    Ashr,
    And,
    Or,
    Xor,

    Icmp,
    Fcmp,

    Trunc,
    Zext,
    Sext,
    Fptoui,
    Fptosi,
    Uitofp,
    Sitofp,
    Fptrunc,
    Fpext,
    Ptrtoint,
    Inttoptr,
    Bitcast,

    ExtractElement,
    InsertElement,
    ShuffleVector,
    ExtractValue,
    InsertValue,

    Gep,
    Alloca,
    Load,
    Store,
    Fence,

    Phi,
    Select,
    Call,

    Br,
    Ret,
    Unreachable,
}

impl Opcode {
    /// Check if this opcode terminates a basic block.
    pub fn is_terminator(self) -> bool {
        matches!(self, Opcode::Br | Opcode::Ret | Opcode::Unreachable)
    }

    /// Check if this opcode is a `phi` node.
    pub fn is_phi(self) -> bool {
        self == Opcode::Phi
    }

    /// Check if this opcode is one of the cast instructions.
    pub fn is_cast(self) -> bool {
        matches!(
            self,
            Opcode::Trunc
                | Opcode::Zext
                | Opcode::Sext
                | Opcode::Fptoui
                | Opcode::Fptosi
                | Opcode::Uitofp
                | Opcode::Sitofp
                | Opcode::Fptrunc
                | Opcode::Fpext
                | Opcode::Ptrtoint
                | Opcode::Inttoptr
                | Opcode::Bitcast
        )
    }
}

impl std::fmt::Display for Opcode {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(
            f,
            "{}",
            match *self {
                Opcode::Add => "add",
                Opcode::Sub => "sub",
                Opcode::Mul => "mul",
                Opcode::Udiv => "udiv",
                Opcode::Sdiv => "sdiv",
                Opcode::Urem => "urem",
                Opcode::Srem => "srem",
                Opcode::Fneg => "fneg",
                Opcode::Fadd => "fadd",
                Opcode::Fsub => "fsub",
                Opcode::Fmul => "fmul",
                Opcode::Fdiv => "fdiv",
                Opcode::Frem => "frem",
                Opcode::Shl => "shl",
                Opcode::Lshr => "lshr",
                Opcode::Ashr => "ashr",
                Opcode::And => "and",
                Opcode::Or => "or",
                Opcode::Xor => "xor",
                Opcode::Icmp => "icmp",
                Opcode::Fcmp => "fcmp",
                Opcode::Trunc => "trunc",
                Opcode::Zext => "zext",
                Opcode::Sext => "sext",
                Opcode::Fptoui => "fptoui",
                Opcode::Fptosi => "fptosi",
                Opcode::Uitofp => "uitofp",
                Opcode::Sitofp => "sitofp",
                Opcode::Fptrunc => "fptrunc",
                Opcode::Fpext => "fpext",
                Opcode::Ptrtoint => "ptrtoint",
                Opcode::Inttoptr => "inttoptr",
                Opcode::Bitcast => "bitcast",
                Opcode::ExtractElement => "extractelement",
                Opcode::InsertElement => "insertelement",
                Opcode::ShuffleVector => "shufflevector",
                Opcode::ExtractValue => "extractvalue",
                Opcode::InsertValue => "insertvalue",
                Opcode::Gep => "getelementptr",
                Opcode::Alloca => "alloca",
                Opcode::Load => "load",
                Opcode::Store => "store",
                Opcode::Fence => "fence",
                Opcode::Phi => "phi",
                Opcode::Select => "select",
                Opcode::Call => "call",
                Opcode::Br => "br",
                Opcode::Ret => "ret",
                Opcode::Unreachable => "unreachable",
            }
        )
    }
}

/// An integer comparison condition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IntCond {
    Eq,
    Ne,
    Ult,
    Ugt,
    Ule,
    Uge,
    Slt,
    Sgt,
    Sle,
    Sge,
}

impl std::fmt::Display for IntCond {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(
            f,
            "{}",
            match *self {
                IntCond::Eq => "eq",
                IntCond::Ne => "ne",
                IntCond::Ult => "ult",
                IntCond::Ugt => "ugt",
                IntCond::Ule => "ule",
                IntCond::Uge => "uge",
                IntCond::Slt => "slt",
                IntCond::Sgt => "sgt",
                IntCond::Sle => "sle",
                IntCond::Sge => "sge",
            }
        )
    }
}

/// A floating-point comparison condition.
///
/// The `O` conditions are ordered (false on NaN), the `U` conditions are
/// unordered (true on NaN).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FloatCond {
    Oeq,
    Ogt,
    Oge,
    Olt,
    Ole,
    One,
    Ord,
    Ueq,
    Ugt,
    Uge,
    Ult,
    Ule,
    Une,
    Uno,
}

impl std::fmt::Display for FloatCond {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(
            f,
            "{}",
            match *self {
                FloatCond::Oeq => "oeq",
                FloatCond::Ogt => "ogt",
                FloatCond::Oge => "oge",
                FloatCond::Olt => "olt",
                FloatCond::Ole => "ole",
                FloatCond::One => "one",
                FloatCond::Ord => "ord",
                FloatCond::Ueq => "ueq",
                FloatCond::Ugt => "ugt",
                FloatCond::Uge => "uge",
                FloatCond::Ult => "ult",
                FloatCond::Ule => "ule",
                FloatCond::Une => "une",
                FloatCond::Uno => "uno",
            }
        )
    }
}

/// Internal table storage of instructions.
///
/// Instructions with the same shape share a variant; the opcode
/// disambiguates. Structural equality of two `InstData` covers opcode,
/// operands in order, immediates, predicates, and volatility, which is
/// exactly the per-instruction half of literal matching.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InstData {
    /// `fence`, `unreachable`, `ret void`
    Nullary { opcode: Opcode },
    /// `fneg type x`, `ret type x`
    Unary { opcode: Opcode, args: [Value; 1] },
    /// `opcode type x, y`
    Binary { opcode: Opcode, args: [Value; 2] },
    /// `select`, `insertelement`, `shufflevector`
    Ternary { opcode: Opcode, args: [Value; 3] },
    /// `opcode type x to type`; the target type is the result type.
    Cast { opcode: Opcode, args: [Value; 1] },
    /// `icmp cond type x, y`
    IntCompare {
        opcode: Opcode,
        cond: IntCond,
        args: [Value; 2],
    },
    /// `fcmp cond type x, y`
    FloatCompare {
        opcode: Opcode,
        cond: FloatCond,
        args: [Value; 2],
    },
    /// `extractvalue` and `insertvalue` with constant index chains.
    Aggregate {
        opcode: Opcode,
        args: Vec<Value>,
        imms: Vec<usize>,
    },
    /// `getelementptr type, ptr p, indices...`
    Gep {
        opcode: Opcode,
        ty: Type,
        args: Vec<Value>,
    },
    /// `alloca type`
    Alloca { opcode: Opcode, ty: Type },
    /// `load [volatile] type, ptr p`
    Load {
        opcode: Opcode,
        args: [Value; 1],
        volatile: bool,
    },
    /// `store [volatile] type x, ptr p`; args are `[value, pointer]`.
    Store {
        opcode: Opcode,
        args: [Value; 2],
        volatile: bool,
    },
    /// `call type @callee(args...)`
    Call {
        opcode: Opcode,
        callee: ExtFunc,
        args: Vec<Value>,
    },
    /// `phi type [x, bb],*`
    Phi {
        opcode: Opcode,
        args: Vec<Value>,
        bbs: Vec<Block>,
    },
    /// `br label bb`
    Jump { opcode: Opcode, bbs: [Block; 1] },
    /// `br i1 x, label bb0, label bb1`
    Branch {
        opcode: Opcode,
        args: [Value; 1],
        bbs: [Block; 2],
    },
}

impl InstData {
    /// Get the opcode of the instruction.
    pub fn opcode(&self) -> Opcode {
        match *self {
            InstData::Nullary { opcode, .. } => opcode,
            InstData::Unary { opcode, .. } => opcode,
            InstData::Binary { opcode, .. } => opcode,
            InstData::Ternary { opcode, .. } => opcode,
            InstData::Cast { opcode, .. } => opcode,
            InstData::IntCompare { opcode, .. } => opcode,
            InstData::FloatCompare { opcode, .. } => opcode,
            InstData::Aggregate { opcode, .. } => opcode,
            InstData::Gep { opcode, .. } => opcode,
            InstData::Alloca { opcode, .. } => opcode,
            InstData::Load { opcode, .. } => opcode,
            InstData::Store { opcode, .. } => opcode,
            InstData::Call { opcode, .. } => opcode,
            InstData::Phi { opcode, .. } => opcode,
            InstData::Jump { opcode, .. } => opcode,
            InstData::Branch { opcode, .. } => opcode,
        }
    }

    /// Get the value arguments of the instruction.
    pub fn args(&self) -> &[Value] {
        match self {
            InstData::Nullary { .. } => &[],
            InstData::Unary { args, .. } => args,
            InstData::Binary { args, .. } => args,
            InstData::Ternary { args, .. } => args,
            InstData::Cast { args, .. } => args,
            InstData::IntCompare { args, .. } => args,
            InstData::FloatCompare { args, .. } => args,
            InstData::Aggregate { args, .. } => args,
            InstData::Gep { args, .. } => args,
            InstData::Alloca { .. } => &[],
            InstData::Load { args, .. } => args,
            InstData::Store { args, .. } => args,
            InstData::Call { args, .. } => args,
            InstData::Phi { args, .. } => args,
            InstData::Jump { .. } => &[],
            InstData::Branch { args, .. } => args,
        }
    }

    /// Get the mutable value arguments of the instruction.
    pub fn args_mut(&mut self) -> &mut [Value] {
        match self {
            InstData::Nullary { .. } => &mut [],
            InstData::Unary { args, .. } => args,
            InstData::Binary { args, .. } => args,
            InstData::Ternary { args, .. } => args,
            InstData::Cast { args, .. } => args,
            InstData::IntCompare { args, .. } => args,
            InstData::FloatCompare { args, .. } => args,
            InstData::Aggregate { args, .. } => args,
            InstData::Gep { args, .. } => args,
            InstData::Alloca { .. } => &mut [],
            InstData::Load { args, .. } => args,
            InstData::Store { args, .. } => args,
            InstData::Call { args, .. } => args,
            InstData::Phi { args, .. } => args,
            InstData::Jump { .. } => &mut [],
            InstData::Branch { args, .. } => args,
        }
    }

    /// Get the block arguments of the instruction.
    pub fn blocks(&self) -> &[Block] {
        match self {
            InstData::Phi { bbs, .. } => bbs,
            InstData::Jump { bbs, .. } => bbs,
            InstData::Branch { bbs, .. } => bbs,
            _ => &[],
        }
    }

    /// Get the mutable block arguments of the instruction.
    pub fn blocks_mut(&mut self) -> &mut [Block] {
        match self {
            InstData::Phi { bbs, .. } => bbs,
            InstData::Jump { bbs, .. } => bbs,
            InstData::Branch { bbs, .. } => bbs,
            _ => &mut [],
        }
    }

    /// Check if a load or store is volatile.
    pub fn is_volatile(&self) -> bool {
        match *self {
            InstData::Load { volatile, .. } => volatile,
            InstData::Store { volatile, .. } => volatile,
            _ => false,
        }
    }

    /// Get the integer comparison condition, if this is an `icmp`.
    pub fn int_cond(&self) -> Option<IntCond> {
        match *self {
            InstData::IntCompare { cond, .. } => Some(cond),
            _ => None,
        }
    }

    /// Get the float comparison condition, if this is an `fcmp`.
    pub fn float_cond(&self) -> Option<FloatCond> {
        match *self {
            InstData::FloatCompare { cond, .. } => Some(cond),
            _ => None,
        }
    }

    /// Replace all uses of a value with another.
    ///
    /// Returns how many uses were replaced.
    pub fn replace_value(&mut self, from: Value, to: Value) -> usize {
        let mut count = 0;
        for arg in self.args_mut() {
            if *arg == from {
                *arg = to;
                count += 1;
            }
        }
        count
    }

    /// Replace all uses of a block with another.
    ///
    /// Returns how many blocks were replaced.
    pub fn replace_block(&mut self, from: Block, to: Block) -> usize {
        let mut count = 0;
        for bb in self.blocks_mut() {
            if *bb == from {
                *bb = to;
                count += 1;
            }
        }
        count
    }
}

/// A temporary object used to construct a single instruction.
pub struct InstBuilder<'a, 'b> {
    builder: &'b mut FunctionBuilder<'a>,
    name: Option<String>,
}

impl<'a, 'b> InstBuilder<'a, 'b> {
    /// Create a new instruction builder that inserts into `builder`.
    pub fn new(builder: &'b mut FunctionBuilder<'a>) -> Self {
        Self {
            builder,
            name: None,
        }
    }

    /// Assign a name to the instruction being built.
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    fn build(&mut self, data: InstData, ty: Type) -> Inst {
        let inst = self.builder.build_inst(data, ty);
        if let Some(name) = self.name.take() {
            if self.builder.dfg().has_result(inst) {
                let value = self.builder.dfg().inst_result(inst);
                self.builder.dfg_mut().set_name(value, name);
            }
        }
        inst
    }

    fn build_result(&mut self, data: InstData, ty: Type) -> Value {
        let inst = self.build(data, ty);
        self.builder.dfg().inst_result(inst)
    }

    fn build_binary(&mut self, opcode: Opcode, ty: Type, x: Value, y: Value) -> Value {
        self.build_result(InstData::Binary { opcode, args: [x, y] }, ty)
    }

    fn value_type(&self, x: Value) -> Type {
        self.builder.dfg().value_type(x)
    }

    /// `fneg type x`
    pub fn fneg(&mut self, x: Value) -> Value {
        let ty = self.value_type(x);
        self.build_result(
            InstData::Unary {
                opcode: Opcode::Fneg,
                args: [x],
            },
            ty,
        )
    }

    /// `add type x, y`
    pub fn add(&mut self, x: Value, y: Value) -> Value {
        let ty = self.value_type(x);
        self.build_binary(Opcode::Add, ty, x, y)
    }

    /// `sub type x, y`
    pub fn sub(&mut self, x: Value, y: Value) -> Value {
        let ty = self.value_type(x);
        self.build_binary(Opcode::Sub, ty, x, y)
    }

    /// `mul type x, y`
    pub fn mul(&mut self, x: Value, y: Value) -> Value {
        let ty = self.value_type(x);
        self.build_binary(Opcode::Mul, ty, x, y)
    }

    /// `udiv type x, y`
    pub fn udiv(&mut self, x: Value, y: Value) -> Value {
        let ty = self.value_type(x);
        self.build_binary(Opcode::Udiv, ty, x, y)
    }

    /// `sdiv type x, y`
    pub fn sdiv(&mut self, x: Value, y: Value) -> Value {
        let ty = self.value_type(x);
        self.build_binary(Opcode::Sdiv, ty, x, y)
    }

    /// `urem type x, y`
    pub fn urem(&mut self, x: Value, y: Value) -> Value {
        let ty = self.value_type(x);
        self.build_binary(Opcode::Urem, ty, x, y)
    }

    /// `srem type x, y`
    pub fn srem(&mut self, x: Value, y: Value) -> Value {
        let ty = self.value_type(x);
        self.build_binary(Opcode::Srem, ty, x, y)
    }

    /// `fadd type x, y`
    pub fn fadd(&mut self, x: Value, y: Value) -> Value {
        let ty = self.value_type(x);
        self.build_binary(Opcode::Fadd, ty, x, y)
    }

    /// `fsub type x, y`
    pub fn fsub(&mut self, x: Value, y: Value) -> Value {
        let ty = self.value_type(x);
        self.build_binary(Opcode::Fsub, ty, x, y)
    }

    /// `fmul type x, y`
    pub fn fmul(&mut self, x: Value, y: Value) -> Value {
        let ty = self.value_type(x);
        self.build_binary(Opcode::Fmul, ty, x, y)
    }

    /// `fdiv type x, y`
    pub fn fdiv(&mut self, x: Value, y: Value) -> Value {
        let ty = self.value_type(x);
        self.build_binary(Opcode::Fdiv, ty, x, y)
    }

    /// `frem type x, y`
    pub fn frem(&mut self, x: Value, y: Value) -> Value {
        let ty = self.value_type(x);
        self.build_binary(Opcode::Frem, ty, x, y)
    }

    /// `shl type x, y`
    pub fn shl(&mut self, x: Value, y: Value) -> Value {
        let ty = self.value_type(x);
        self.build_binary(Opcode::Shl, ty, x, y)
    }

    /// `lshr type x, y`
    pub fn lshr(&mut self, x: Value, y: Value) -> Value {
        let ty = self.value_type(x);
        self.build_binary(Opcode::Lshr, ty, x, y)
    }

    /// `ashr type x, y`
    pub fn ashr(&mut self, x: Value, y: Value) -> Value {
        let ty = self.value_type(x);
        self.build_binary(Opcode::Ashr, ty, x, y)
    }

    /// `and type x, y`
    pub fn and(&mut self, x: Value, y: Value) -> Value {
        let ty = self.value_type(x);
        self.build_binary(Opcode::And, ty, x, y)
    }

    /// `or type x, y`
    pub fn or(&mut self, x: Value, y: Value) -> Value {
        let ty = self.value_type(x);
        self.build_binary(Opcode::Or, ty, x, y)
    }

    /// `xor type x, y`
    pub fn xor(&mut self, x: Value, y: Value) -> Value {
        let ty = self.value_type(x);
        self.build_binary(Opcode::Xor, ty, x, y)
    }

    /// `icmp cond type x, y`
    pub fn icmp(&mut self, cond: IntCond, x: Value, y: Value) -> Value {
        self.build_result(
            InstData::IntCompare {
                opcode: Opcode::Icmp,
                cond,
                args: [x, y],
            },
            int_ty(1),
        )
    }

    /// `fcmp cond type x, y`
    pub fn fcmp(&mut self, cond: FloatCond, x: Value, y: Value) -> Value {
        self.build_result(
            InstData::FloatCompare {
                opcode: Opcode::Fcmp,
                cond,
                args: [x, y],
            },
            int_ty(1),
        )
    }

    /// `opcode type x to ty`
    pub fn cast(&mut self, opcode: Opcode, x: Value, ty: Type) -> Value {
        assert!(opcode.is_cast(), "{} is not a cast", opcode);
        self.build_result(InstData::Cast { opcode, args: [x] }, ty)
    }

    /// `extractelement type x, type y`
    pub fn extract_element(&mut self, x: Value, index: Value) -> Value {
        let ty = self.value_type(x).unwrap_vector().1.clone();
        self.build_result(
            InstData::Binary {
                opcode: Opcode::ExtractElement,
                args: [x, index],
            },
            ty,
        )
    }

    /// `insertelement type x, type y, type z`
    pub fn insert_element(&mut self, x: Value, element: Value, index: Value) -> Value {
        let ty = self.value_type(x);
        self.build_result(
            InstData::Ternary {
                opcode: Opcode::InsertElement,
                args: [x, element, index],
            },
            ty,
        )
    }

    /// `shufflevector type x, type y, type mask`
    pub fn shuffle_vector(&mut self, x: Value, y: Value, mask: Value) -> Value {
        let (length, _) = match *self.value_type(mask) {
            crate::ty::TypeKind::VectorType(l, _) => (l, ()),
            _ => panic!("shufflevector mask must be a vector"),
        };
        let elem = self.value_type(x).unwrap_vector().1.clone();
        let ty = crate::ty::vector_ty(length, elem);
        self.build_result(
            InstData::Ternary {
                opcode: Opcode::ShuffleVector,
                args: [x, y, mask],
            },
            ty,
        )
    }

    /// `extractvalue type x, indices...`
    pub fn extract_value(&mut self, x: Value, indices: Vec<usize>) -> Value {
        let mut ty = self.value_type(x);
        for &idx in &indices {
            ty = ty
                .field(idx)
                .unwrap_or_else(|| panic!("no field {} in {}", idx, ty))
                .clone();
        }
        self.build_result(
            InstData::Aggregate {
                opcode: Opcode::ExtractValue,
                args: vec![x],
                imms: indices,
            },
            ty,
        )
    }

    /// `insertvalue type x, type y, indices...`
    pub fn insert_value(&mut self, x: Value, element: Value, indices: Vec<usize>) -> Value {
        let ty = self.value_type(x);
        self.build_result(
            InstData::Aggregate {
                opcode: Opcode::InsertValue,
                args: vec![x, element],
                imms: indices,
            },
            ty,
        )
    }

    /// `getelementptr type, ptr p, indices...`
    pub fn gep(&mut self, ty: Type, pointer: Value, indices: Vec<Value>) -> Value {
        let mut args = vec![pointer];
        args.extend(indices);
        self.build_result(
            InstData::Gep {
                opcode: Opcode::Gep,
                ty,
                args,
            },
            pointer_ty(),
        )
    }

    /// `alloca type`
    pub fn alloca(&mut self, ty: Type) -> Value {
        self.build_result(
            InstData::Alloca {
                opcode: Opcode::Alloca,
                ty,
            },
            pointer_ty(),
        )
    }

    /// `load type, ptr p`
    pub fn load(&mut self, ty: Type, pointer: Value) -> Value {
        self.build_result(
            InstData::Load {
                opcode: Opcode::Load,
                args: [pointer],
                volatile: false,
            },
            ty,
        )
    }

    /// `load volatile type, ptr p`
    pub fn load_volatile(&mut self, ty: Type, pointer: Value) -> Value {
        self.build_result(
            InstData::Load {
                opcode: Opcode::Load,
                args: [pointer],
                volatile: true,
            },
            ty,
        )
    }

    /// `store type x, ptr p`
    pub fn store(&mut self, value: Value, pointer: Value) -> Inst {
        self.build(
            InstData::Store {
                opcode: Opcode::Store,
                args: [value, pointer],
                volatile: false,
            },
            void_ty(),
        )
    }

    /// `store volatile type x, ptr p`
    pub fn store_volatile(&mut self, value: Value, pointer: Value) -> Inst {
        self.build(
            InstData::Store {
                opcode: Opcode::Store,
                args: [value, pointer],
                volatile: true,
            },
            void_ty(),
        )
    }

    /// `fence`
    pub fn fence(&mut self) -> Inst {
        self.build(
            InstData::Nullary {
                opcode: Opcode::Fence,
            },
            void_ty(),
        )
    }

    /// `phi type [x, bb],*`
    pub fn phi(&mut self, ty: Type, args: Vec<Value>, bbs: Vec<Block>) -> Value {
        assert_eq!(args.len(), bbs.len());
        self.build_result(
            InstData::Phi {
                opcode: Opcode::Phi,
                args,
                bbs,
            },
            ty,
        )
    }

    /// `select i1 c, type x, type y`
    pub fn select(&mut self, cond: Value, x: Value, y: Value) -> Value {
        let ty = self.value_type(x);
        self.build_result(
            InstData::Ternary {
                opcode: Opcode::Select,
                args: [cond, x, y],
            },
            ty,
        )
    }

    /// `call type @callee(args...)`
    pub fn call(&mut self, callee: ExtFunc, args: Vec<Value>) -> Inst {
        let ty = self.builder.dfg()[callee].sig.return_type();
        self.build(
            InstData::Call {
                opcode: Opcode::Call,
                callee,
                args,
            },
            ty,
        )
    }

    /// `br label bb`
    pub fn br(&mut self, bb: Block) -> Inst {
        self.build(
            InstData::Jump {
                opcode: Opcode::Br,
                bbs: [bb],
            },
            void_ty(),
        )
    }

    /// `br i1 c, label bb0, label bb1`
    pub fn br_cond(&mut self, cond: Value, bb0: Block, bb1: Block) -> Inst {
        self.build(
            InstData::Branch {
                opcode: Opcode::Br,
                args: [cond],
                bbs: [bb0, bb1],
            },
            void_ty(),
        )
    }

    /// `ret void`
    pub fn ret(&mut self) -> Inst {
        self.build(
            InstData::Nullary {
                opcode: Opcode::Ret,
            },
            void_ty(),
        )
    }

    /// `ret type x`
    pub fn ret_value(&mut self, x: Value) -> Inst {
        self.build(
            InstData::Unary {
                opcode: Opcode::Ret,
                args: [x],
            },
            void_ty(),
        )
    }

    /// `unreachable`
    pub fn unreachable(&mut self) -> Inst {
        self.build(
            InstData::Nullary {
                opcode: Opcode::Unreachable,
            },
            void_ty(),
        )
    }
}
