// Copyright (c) 2017-2021 Fabian Schuiki

//! Parsing of the textual IR format back into a module.
//!
//! The reader resolves names per function. Blocks may be referenced before
//! their label is seen; values may be referenced before their definition
//! (loop phis), in which case a placeholder value stands in until the
//! definition replaces it.

use crate::{
    assembly::lexer::{tokenize, Loc, ParseError, Token},
    ir::{Block, FloatCond, Function, InstData, IntCond, Module, Opcode, Signature, Value},
    konst::{const_float, const_int, Konst},
    ty::{float_ty, int_ty, pointer_ty, struct_ty, vector_ty, void_ty, Type, TypeKind},
};
use num::ToPrimitive;
use std::collections::HashMap;

/// Parse a module from a string.
pub fn parse_module(input: &str) -> Result<Module, ParseError> {
    let tokens = tokenize(input)?;
    let mut parser = Parser { tokens, pos: 0 };
    parser.parse_module()
}

/// Per-function name resolution state.
#[derive(Default)]
struct FuncContext {
    /// Values defined so far, by name.
    values: HashMap<String, Value>,
    /// Placeholders for values referenced before their definition.
    pending: HashMap<String, Value>,
    /// Blocks, by label. Referenced blocks exist in the CFG before their
    /// label inserts them into the layout.
    blocks: HashMap<String, Block>,
}

struct Parser {
    tokens: Vec<(Token, Loc)>,
    pos: usize,
}

impl Parser {
    fn peek(&self) -> &Token {
        &self.tokens[self.pos].0
    }

    fn peek2(&self) -> &Token {
        &self.tokens[(self.pos + 1).min(self.tokens.len() - 1)].0
    }

    fn loc(&self) -> Loc {
        self.tokens[self.pos].1
    }

    fn bump(&mut self) -> Token {
        let token = self.tokens[self.pos].0.clone();
        if self.pos + 1 < self.tokens.len() {
            self.pos += 1;
        }
        token
    }

    fn error<T>(&self, message: impl Into<String>) -> Result<T, ParseError> {
        Err(ParseError {
            loc: self.loc(),
            message: message.into(),
        })
    }

    fn expect(&mut self, token: Token) -> Result<(), ParseError> {
        if *self.peek() == token {
            self.bump();
            Ok(())
        } else {
            self.error(format!("expected `{}`, found `{}`", token, self.peek()))
        }
    }

    fn expect_word(&mut self, word: &str) -> Result<(), ParseError> {
        match self.peek() {
            Token::Word(w) if w == word => {
                self.bump();
                Ok(())
            }
            other => self.error(format!("expected `{}`, found `{}`", word, other)),
        }
    }

    fn eat_word(&mut self, word: &str) -> bool {
        match self.peek() {
            Token::Word(w) if w == word => {
                self.bump();
                true
            }
            _ => false,
        }
    }

    fn parse_word(&mut self) -> Result<String, ParseError> {
        match self.bump() {
            Token::Word(w) => Ok(w),
            other => self.error(format!("expected a word, found `{}`", other)),
        }
    }

    fn parse_local(&mut self) -> Result<String, ParseError> {
        match self.bump() {
            Token::LocalIdent(name) => Ok(name),
            other => self.error(format!("expected a local name, found `{}`", other)),
        }
    }

    fn parse_global(&mut self) -> Result<String, ParseError> {
        match self.bump() {
            Token::GlobalIdent(name) => Ok(name),
            other => self.error(format!("expected a global name, found `{}`", other)),
        }
    }

    fn parse_index(&mut self) -> Result<usize, ParseError> {
        match self.bump() {
            Token::Int(v) => match v.to_usize() {
                Some(v) => Ok(v),
                None => self.error("index out of range"),
            },
            other => self.error(format!("expected an index, found `{}`", other)),
        }
    }

    /// Parse a module.
    fn parse_module(&mut self) -> Result<Module, ParseError> {
        let mut module = Module::new();
        loop {
            match self.peek() {
                Token::Eof => break,
                Token::Word(w) if w == "declare" => {
                    self.bump();
                    let mut sig = Signature::new();
                    let ret = self.parse_type()?;
                    sig.set_return_type(ret);
                    let name = self.parse_global()?;
                    self.expect(Token::LParen)?;
                    if *self.peek() != Token::RParen {
                        loop {
                            let ty = self.parse_type()?;
                            sig.add_arg(ty);
                            if !self.eat(Token::Comma) {
                                break;
                            }
                        }
                    }
                    self.expect(Token::RParen)?;
                    module.declare(name, sig);
                }
                Token::Word(w) if w == "define" => {
                    let func = self.parse_function()?;
                    module.add_function(func);
                }
                other => {
                    return self.error(format!(
                        "expected `declare` or `define`, found `{}`",
                        other
                    ))
                }
            }
        }
        Ok(module)
    }

    fn eat(&mut self, token: Token) -> bool {
        if *self.peek() == token {
            self.bump();
            true
        } else {
            false
        }
    }

    /// Parse a type.
    fn parse_type(&mut self) -> Result<Type, ParseError> {
        match self.bump() {
            Token::Word(w) => match w.as_str() {
                "void" => Ok(void_ty()),
                "ptr" => Ok(pointer_ty()),
                "f32" => Ok(float_ty(32)),
                "f64" => Ok(float_ty(64)),
                _ => {
                    if let Some(width) = w.strip_prefix('i').and_then(|d| d.parse::<usize>().ok())
                    {
                        Ok(int_ty(width))
                    } else {
                        self.error(format!("unknown type `{}`", w))
                    }
                }
            },
            Token::LAngle => {
                let length = self.parse_index()?;
                self.expect_word("x")?;
                let element = self.parse_type()?;
                self.expect(Token::RAngle)?;
                Ok(vector_ty(length, element))
            }
            Token::LBracket => {
                let length = self.parse_index()?;
                self.expect_word("x")?;
                let element = self.parse_type()?;
                self.expect(Token::RBracket)?;
                Ok(crate::ty::array_ty(length, element))
            }
            Token::LBrace => {
                let mut fields = vec![];
                if *self.peek() != Token::RBrace {
                    loop {
                        fields.push(self.parse_type()?);
                        if !self.eat(Token::Comma) {
                            break;
                        }
                    }
                }
                self.expect(Token::RBrace)?;
                Ok(struct_ty(fields))
            }
            other => self.error(format!("expected a type, found `{}`", other)),
        }
    }

    /// Parse a function definition.
    fn parse_function(&mut self) -> Result<Function, ParseError> {
        self.expect_word("define")?;
        let ret = self.parse_type()?;
        let name = self.parse_global()?;

        let mut sig = Signature::new();
        sig.set_return_type(ret);
        let mut arg_names = vec![];
        self.expect(Token::LParen)?;
        if *self.peek() != Token::RParen {
            loop {
                let ty = self.parse_type()?;
                let arg_name = self.parse_local()?;
                sig.add_arg(ty);
                arg_names.push(arg_name);
                if !self.eat(Token::Comma) {
                    break;
                }
            }
        }
        self.expect(Token::RParen)?;

        let mut func = Function::new(name, sig);
        let mut ctx = FuncContext::default();
        for (arg, name) in func.sig.args().zip(arg_names) {
            let value = func.dfg.arg_value(arg);
            func.dfg.set_name(value, name.clone());
            if ctx.values.insert(name.clone(), value).is_some() {
                return self.error(format!("argument `%{}` redefined", name));
            }
        }

        self.expect(Token::LBrace)?;
        while !self.eat(Token::RBrace) {
            self.parse_block(&mut func, &mut ctx)?;
        }

        if let Some(name) = ctx.pending.keys().next() {
            return self.error(format!("use of undefined value `%{}`", name));
        }
        for (name, &bb) in &ctx.blocks {
            if !func.layout.is_block_inserted(bb) {
                return self.error(format!("use of undefined label `%{}`", name));
            }
        }
        Ok(func)
    }

    /// Parse a label, which is a bare word or a bare number.
    fn parse_label(&mut self) -> Result<String, ParseError> {
        match self.bump() {
            Token::Word(w) => Ok(w),
            Token::Int(v) => Ok(v.to_string()),
            other => self.error(format!("expected a label, found `{}`", other)),
        }
    }

    /// Parse a labeled basic block and its instructions.
    fn parse_block(&mut self, func: &mut Function, ctx: &mut FuncContext) -> Result<(), ParseError> {
        let label = self.parse_label()?;
        self.expect(Token::Colon)?;
        let bb = block_by_name(func, ctx, &label);
        if func.layout.is_block_inserted(bb) {
            return self.error(format!("label `{}` redefined", label));
        }
        func.layout.append_block(bb);

        loop {
            match self.peek() {
                Token::RBrace => break,
                Token::Word(_) | Token::Int(_) if *self.peek2() == Token::Colon => break,
                Token::Eof => return self.error("unexpected end of input in function body"),
                _ => self.parse_inst(func, ctx, bb)?,
            }
        }
        Ok(())
    }

    /// Parse a single instruction and append it to `bb`.
    fn parse_inst(
        &mut self,
        func: &mut Function,
        ctx: &mut FuncContext,
        bb: Block,
    ) -> Result<(), ParseError> {
        let name = if let Token::LocalIdent(_) = self.peek() {
            let name = self.parse_local()?;
            self.expect(Token::Equal)?;
            Some(name)
        } else {
            None
        };

        let opcode = self.parse_word()?;
        let (data, ty) = match opcode.as_str() {
            "add" => self.parse_binary(func, ctx, Opcode::Add)?,
            "sub" => self.parse_binary(func, ctx, Opcode::Sub)?,
            "mul" => self.parse_binary(func, ctx, Opcode::Mul)?,
            "udiv" => self.parse_binary(func, ctx, Opcode::Udiv)?,
            "sdiv" => self.parse_binary(func, ctx, Opcode::Sdiv)?,
            "urem" => self.parse_binary(func, ctx, Opcode::Urem)?,
            "srem" => self.parse_binary(func, ctx, Opcode::Srem)?,
            "fadd" => self.parse_binary(func, ctx, Opcode::Fadd)?,
            "fsub" => self.parse_binary(func, ctx, Opcode::Fsub)?,
            "fmul" => self.parse_binary(func, ctx, Opcode::Fmul)?,
            "fdiv" => self.parse_binary(func, ctx, Opcode::Fdiv)?,
            "frem" => self.parse_binary(func, ctx, Opcode::Frem)?,
            "shl" => self.parse_binary(func, ctx, Opcode::Shl)?,
            "lshr" => self.parse_binary(func, ctx, Opcode::Lshr)?,
            "ashr" => self.parse_binary(func, ctx, Opcode::Ashr)?,
            "and" => self.parse_binary(func, ctx, Opcode::And)?,
            "or" => self.parse_binary(func, ctx, Opcode::Or)?,
            "xor" => self.parse_binary(func, ctx, Opcode::Xor)?,
            "fneg" => {
                let ty = self.parse_type()?;
                let x = self.parse_operand(func, ctx, &ty)?;
                (
                    InstData::Unary {
                        opcode: Opcode::Fneg,
                        args: [x],
                    },
                    ty,
                )
            }
            "icmp" => {
                let cond = self.parse_int_cond()?;
                let ty = self.parse_type()?;
                let x = self.parse_operand(func, ctx, &ty)?;
                self.expect(Token::Comma)?;
                let y = self.parse_operand(func, ctx, &ty)?;
                (
                    InstData::IntCompare {
                        opcode: Opcode::Icmp,
                        cond,
                        args: [x, y],
                    },
                    int_ty(1),
                )
            }
            "fcmp" => {
                let cond = self.parse_float_cond()?;
                let ty = self.parse_type()?;
                let x = self.parse_operand(func, ctx, &ty)?;
                self.expect(Token::Comma)?;
                let y = self.parse_operand(func, ctx, &ty)?;
                (
                    InstData::FloatCompare {
                        opcode: Opcode::Fcmp,
                        cond,
                        args: [x, y],
                    },
                    int_ty(1),
                )
            }
            "trunc" => self.parse_cast(func, ctx, Opcode::Trunc)?,
            "zext" => self.parse_cast(func, ctx, Opcode::Zext)?,
            "sext" => self.parse_cast(func, ctx, Opcode::Sext)?,
            "fptoui" => self.parse_cast(func, ctx, Opcode::Fptoui)?,
            "fptosi" => self.parse_cast(func, ctx, Opcode::Fptosi)?,
            "uitofp" => self.parse_cast(func, ctx, Opcode::Uitofp)?,
            "sitofp" => self.parse_cast(func, ctx, Opcode::Sitofp)?,
            "fptrunc" => self.parse_cast(func, ctx, Opcode::Fptrunc)?,
            "fpext" => self.parse_cast(func, ctx, Opcode::Fpext)?,
            "ptrtoint" => self.parse_cast(func, ctx, Opcode::Ptrtoint)?,
            "inttoptr" => self.parse_cast(func, ctx, Opcode::Inttoptr)?,
            "bitcast" => self.parse_cast(func, ctx, Opcode::Bitcast)?,
            "extractelement" => {
                let vty = self.parse_type()?;
                let v = self.parse_operand(func, ctx, &vty)?;
                self.expect(Token::Comma)?;
                let ity = self.parse_type()?;
                let i = self.parse_operand(func, ctx, &ity)?;
                let elem = match &*vty {
                    TypeKind::VectorType(_, elem) => elem.clone(),
                    _ => return self.error("extractelement requires a vector type"),
                };
                (
                    InstData::Binary {
                        opcode: Opcode::ExtractElement,
                        args: [v, i],
                    },
                    elem,
                )
            }
            "insertelement" => {
                let vty = self.parse_type()?;
                let v = self.parse_operand(func, ctx, &vty)?;
                self.expect(Token::Comma)?;
                let ety = self.parse_type()?;
                let e = self.parse_operand(func, ctx, &ety)?;
                self.expect(Token::Comma)?;
                let ity = self.parse_type()?;
                let i = self.parse_operand(func, ctx, &ity)?;
                (
                    InstData::Ternary {
                        opcode: Opcode::InsertElement,
                        args: [v, e, i],
                    },
                    vty,
                )
            }
            "shufflevector" => {
                let aty = self.parse_type()?;
                let a = self.parse_operand(func, ctx, &aty)?;
                self.expect(Token::Comma)?;
                let bty = self.parse_type()?;
                let b = self.parse_operand(func, ctx, &bty)?;
                self.expect(Token::Comma)?;
                let mty = self.parse_type()?;
                let m = self.parse_operand(func, ctx, &mty)?;
                let ty = match (&*aty, &*mty) {
                    (TypeKind::VectorType(_, elem), TypeKind::VectorType(l, _)) => {
                        vector_ty(*l, elem.clone())
                    }
                    _ => return self.error("shufflevector requires vector types"),
                };
                (
                    InstData::Ternary {
                        opcode: Opcode::ShuffleVector,
                        args: [a, b, m],
                    },
                    ty,
                )
            }
            "extractvalue" => {
                let aty = self.parse_type()?;
                let a = self.parse_operand(func, ctx, &aty)?;
                let mut imms = vec![];
                while self.eat(Token::Comma) {
                    imms.push(self.parse_index()?);
                }
                if imms.is_empty() {
                    return self.error("extractvalue requires at least one index");
                }
                let mut ty = aty;
                for &idx in &imms {
                    ty = match ty.field(idx) {
                        Some(f) => f.clone(),
                        None => return self.error(format!("no field {} in aggregate", idx)),
                    };
                }
                (
                    InstData::Aggregate {
                        opcode: Opcode::ExtractValue,
                        args: vec![a],
                        imms,
                    },
                    ty,
                )
            }
            "insertvalue" => {
                let aty = self.parse_type()?;
                let a = self.parse_operand(func, ctx, &aty)?;
                self.expect(Token::Comma)?;
                let ety = self.parse_type()?;
                let e = self.parse_operand(func, ctx, &ety)?;
                let mut imms = vec![];
                while self.eat(Token::Comma) {
                    imms.push(self.parse_index()?);
                }
                if imms.is_empty() {
                    return self.error("insertvalue requires at least one index");
                }
                (
                    InstData::Aggregate {
                        opcode: Opcode::InsertValue,
                        args: vec![a, e],
                        imms,
                    },
                    aty,
                )
            }
            "getelementptr" => {
                let elem = self.parse_type()?;
                self.expect(Token::Comma)?;
                let pty = self.parse_type()?;
                let p = self.parse_operand(func, ctx, &pty)?;
                let mut args = vec![p];
                while self.eat(Token::Comma) {
                    let ity = self.parse_type()?;
                    args.push(self.parse_operand(func, ctx, &ity)?);
                }
                (
                    InstData::Gep {
                        opcode: Opcode::Gep,
                        ty: elem,
                        args,
                    },
                    pointer_ty(),
                )
            }
            "alloca" => {
                let ty = self.parse_type()?;
                (
                    InstData::Alloca {
                        opcode: Opcode::Alloca,
                        ty,
                    },
                    pointer_ty(),
                )
            }
            "load" => {
                let volatile = self.eat_word("volatile");
                let ty = self.parse_type()?;
                self.expect(Token::Comma)?;
                let pty = self.parse_type()?;
                let p = self.parse_operand(func, ctx, &pty)?;
                (
                    InstData::Load {
                        opcode: Opcode::Load,
                        args: [p],
                        volatile,
                    },
                    ty,
                )
            }
            "store" => {
                let volatile = self.eat_word("volatile");
                let ty = self.parse_type()?;
                let v = self.parse_operand(func, ctx, &ty)?;
                self.expect(Token::Comma)?;
                let pty = self.parse_type()?;
                let p = self.parse_operand(func, ctx, &pty)?;
                (
                    InstData::Store {
                        opcode: Opcode::Store,
                        args: [v, p],
                        volatile,
                    },
                    void_ty(),
                )
            }
            "fence" => (
                InstData::Nullary {
                    opcode: Opcode::Fence,
                },
                void_ty(),
            ),
            "phi" => {
                let ty = self.parse_type()?;
                let mut args = vec![];
                let mut bbs = vec![];
                loop {
                    self.expect(Token::LBracket)?;
                    args.push(self.parse_operand(func, ctx, &ty)?);
                    self.expect(Token::Comma)?;
                    let label = self.parse_local()?;
                    bbs.push(block_by_name(func, ctx, &label));
                    self.expect(Token::RBracket)?;
                    if !self.eat(Token::Comma) {
                        break;
                    }
                }
                (
                    InstData::Phi {
                        opcode: Opcode::Phi,
                        args,
                        bbs,
                    },
                    ty,
                )
            }
            "select" => {
                let cty = self.parse_type()?;
                let c = self.parse_operand(func, ctx, &cty)?;
                self.expect(Token::Comma)?;
                let ty = self.parse_type()?;
                let x = self.parse_operand(func, ctx, &ty)?;
                self.expect(Token::Comma)?;
                let yty = self.parse_type()?;
                let y = self.parse_operand(func, ctx, &yty)?;
                (
                    InstData::Ternary {
                        opcode: Opcode::Select,
                        args: [c, x, y],
                    },
                    ty,
                )
            }
            "call" => {
                let ret = self.parse_type()?;
                let callee = self.parse_global()?;
                let mut sig = Signature::new();
                sig.set_return_type(ret.clone());
                let mut args = vec![];
                self.expect(Token::LParen)?;
                if *self.peek() != Token::RParen {
                    loop {
                        let ty = self.parse_type()?;
                        sig.add_arg(ty.clone());
                        args.push(self.parse_operand(func, ctx, &ty)?);
                        if !self.eat(Token::Comma) {
                            break;
                        }
                    }
                }
                self.expect(Token::RParen)?;
                let ext = func.dfg.add_ext_func(callee, sig);
                (
                    InstData::Call {
                        opcode: Opcode::Call,
                        callee: ext,
                        args,
                    },
                    ret,
                )
            }
            "br" => {
                if self.eat_word("label") {
                    let label = self.parse_local()?;
                    let target = block_by_name(func, ctx, &label);
                    (
                        InstData::Jump {
                            opcode: Opcode::Br,
                            bbs: [target],
                        },
                        void_ty(),
                    )
                } else {
                    let cty = self.parse_type()?;
                    let c = self.parse_operand(func, ctx, &cty)?;
                    self.expect(Token::Comma)?;
                    self.expect_word("label")?;
                    let label0 = self.parse_local()?;
                    self.expect(Token::Comma)?;
                    self.expect_word("label")?;
                    let label1 = self.parse_local()?;
                    let bb0 = block_by_name(func, ctx, &label0);
                    let bb1 = block_by_name(func, ctx, &label1);
                    (
                        InstData::Branch {
                            opcode: Opcode::Br,
                            args: [c],
                            bbs: [bb0, bb1],
                        },
                        void_ty(),
                    )
                }
            }
            "ret" => {
                let ty = self.parse_type()?;
                if ty.is_void() {
                    (
                        InstData::Nullary {
                            opcode: Opcode::Ret,
                        },
                        void_ty(),
                    )
                } else {
                    let x = self.parse_operand(func, ctx, &ty)?;
                    (
                        InstData::Unary {
                            opcode: Opcode::Ret,
                            args: [x],
                        },
                        void_ty(),
                    )
                }
            }
            "unreachable" => (
                InstData::Nullary {
                    opcode: Opcode::Unreachable,
                },
                void_ty(),
            ),
            other => return self.error(format!("unknown instruction `{}`", other)),
        };

        let inst = func.dfg.add_inst(data, ty);
        func.layout.append_inst(inst, bb);

        if func.dfg.has_result(inst) {
            let result = func.dfg.inst_result(inst);
            match name {
                Some(name) => define_value(self, func, ctx, name, result)?,
                None => return self.error("instruction result requires a name"),
            }
        } else if name.is_some() {
            return self.error("instruction does not produce a result");
        }
        Ok(())
    }

    fn parse_binary(
        &mut self,
        func: &mut Function,
        ctx: &mut FuncContext,
        opcode: Opcode,
    ) -> Result<(InstData, Type), ParseError> {
        let ty = self.parse_type()?;
        let x = self.parse_operand(func, ctx, &ty)?;
        self.expect(Token::Comma)?;
        let y = self.parse_operand(func, ctx, &ty)?;
        Ok((InstData::Binary { opcode, args: [x, y] }, ty))
    }

    fn parse_cast(
        &mut self,
        func: &mut Function,
        ctx: &mut FuncContext,
        opcode: Opcode,
    ) -> Result<(InstData, Type), ParseError> {
        let from = self.parse_type()?;
        let x = self.parse_operand(func, ctx, &from)?;
        self.expect_word("to")?;
        let to = self.parse_type()?;
        Ok((InstData::Cast { opcode, args: [x] }, to))
    }

    fn parse_int_cond(&mut self) -> Result<IntCond, ParseError> {
        let word = self.parse_word()?;
        Ok(match word.as_str() {
            "eq" => IntCond::Eq,
            "ne" => IntCond::Ne,
            "ult" => IntCond::Ult,
            "ugt" => IntCond::Ugt,
            "ule" => IntCond::Ule,
            "uge" => IntCond::Uge,
            "slt" => IntCond::Slt,
            "sgt" => IntCond::Sgt,
            "sle" => IntCond::Sle,
            "sge" => IntCond::Sge,
            other => return self.error(format!("unknown icmp condition `{}`", other)),
        })
    }

    fn parse_float_cond(&mut self) -> Result<FloatCond, ParseError> {
        let word = self.parse_word()?;
        Ok(match word.as_str() {
            "oeq" => FloatCond::Oeq,
            "ogt" => FloatCond::Ogt,
            "oge" => FloatCond::Oge,
            "olt" => FloatCond::Olt,
            "ole" => FloatCond::Ole,
            "one" => FloatCond::One,
            "ord" => FloatCond::Ord,
            "ueq" => FloatCond::Ueq,
            "ugt" => FloatCond::Ugt,
            "uge" => FloatCond::Uge,
            "ult" => FloatCond::Ult,
            "ule" => FloatCond::Ule,
            "une" => FloatCond::Une,
            "uno" => FloatCond::Uno,
            other => return self.error(format!("unknown fcmp condition `{}`", other)),
        })
    }

    /// Parse an operand of a known type.
    fn parse_operand(
        &mut self,
        func: &mut Function,
        ctx: &mut FuncContext,
        ty: &Type,
    ) -> Result<Value, ParseError> {
        match self.bump() {
            Token::LocalIdent(name) => {
                if let Some(&value) = ctx.values.get(&name) {
                    Ok(value)
                } else if let Some(&value) = ctx.pending.get(&name) {
                    Ok(value)
                } else {
                    let placeholder = func.dfg.add_placeholder(ty.clone());
                    ctx.pending.insert(name, placeholder);
                    Ok(placeholder)
                }
            }
            Token::Int(v) => match **ty {
                TypeKind::IntType(w) => Ok(func.dfg.const_value(ty.clone(), const_int(w, v))),
                TypeKind::FloatType(_) => {
                    let value = v
                        .to_f64()
                        .ok_or_else(|| ParseError {
                            loc: self.loc(),
                            message: "integer literal out of float range".to_string(),
                        })?;
                    Ok(func.dfg.const_value(ty.clone(), const_float(value)))
                }
                _ => self.error(format!("integer literal needs an integer type, got `{}`", ty)),
            },
            Token::Float(v) => match **ty {
                TypeKind::FloatType(32) => {
                    Ok(func.dfg.const_value(ty.clone(), const_float(v as f32 as f64)))
                }
                TypeKind::FloatType(_) => Ok(func.dfg.const_value(ty.clone(), const_float(v))),
                _ => self.error(format!("float literal needs a float type, got `{}`", ty)),
            },
            Token::HexBits(bits) => match **ty {
                TypeKind::FloatType(_) => {
                    Ok(func.dfg.const_value(ty.clone(), Konst::Float(bits)))
                }
                _ => self.error(format!("bit pattern needs a float type, got `{}`", ty)),
            },
            Token::Word(w) => match w.as_str() {
                "null" if ty.is_pointer() => {
                    Ok(func.dfg.const_value(ty.clone(), Konst::Null))
                }
                "undef" => Ok(func.dfg.const_value(ty.clone(), Konst::Undef)),
                "true" if ty.is_int() => {
                    Ok(func.dfg.const_value(ty.clone(), const_int(1, 1)))
                }
                "false" if ty.is_int() => {
                    Ok(func.dfg.const_value(ty.clone(), const_int(1, 0)))
                }
                other => self.error(format!("expected an operand, found `{}`", other)),
            },
            other => self.error(format!("expected an operand, found `{}`", other)),
        }
    }
}

/// Resolve a block label, creating the block if it does not exist yet.
///
/// Blocks created through a forward reference are not part of the layout
/// until their label is parsed.
fn block_by_name(func: &mut Function, ctx: &mut FuncContext, name: &str) -> Block {
    if let Some(&bb) = ctx.blocks.get(name) {
        return bb;
    }
    let bb = func.cfg.add_block();
    func.cfg.set_name(bb, name.to_string());
    ctx.blocks.insert(name.to_string(), bb);
    bb
}

/// Record a value definition, resolving any pending forward reference.
fn define_value(
    parser: &Parser,
    func: &mut Function,
    ctx: &mut FuncContext,
    name: String,
    value: Value,
) -> Result<(), ParseError> {
    if ctx.values.contains_key(&name) {
        return parser.error(format!("value `%{}` redefined", name));
    }
    if let Some(placeholder) = ctx.pending.remove(&name) {
        func.dfg.replace_use(placeholder, value);
        func.dfg.remove_placeholder(placeholder);
    }
    func.dfg.set_name(value, name.clone());
    ctx.values.insert(name, value);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::Opcode;

    #[test]
    fn parse_simple_function() {
        let module = parse_module(
            r#"
            define i32 @sum3(i32 %a, i32 %b, i32 %c) {
            entry:
              %t = add i32 %a, %b
              %u = add i32 %t, %c
              ret i32 %u
            }
            "#,
        )
        .unwrap();
        let func = module.function(module.functions().next().unwrap());
        assert_eq!(func.name, "sum3");
        let bb = func.layout.entry();
        let opcodes: Vec<_> = func
            .layout
            .insts(bb)
            .map(|inst| func.dfg[inst].opcode())
            .collect();
        assert_eq!(opcodes, vec![Opcode::Add, Opcode::Add, Opcode::Ret]);
    }

    #[test]
    fn parse_forward_references() {
        let module = parse_module(
            r#"
            define i32 @count(i32 %n) {
            entry:
              br label %head
            head:
              %i = phi i32 [ 0, %entry ], [ %next, %body ]
              %done = icmp eq i32 %i, %n
              br i1 %done, label %exit, label %body
            body:
              %next = add i32 %i, 1
              br label %head
            exit:
              ret i32 %i
            }
            "#,
        )
        .unwrap();
        let func = module.function(module.functions().next().unwrap());
        assert_eq!(func.layout.blocks().count(), 4);
        func.verify();
    }

    #[test]
    fn undefined_value_is_an_error() {
        let err = parse_module(
            r#"
            define i32 @broken() {
            entry:
              ret i32 %nope
            }
            "#,
        )
        .unwrap_err();
        assert!(err.message.contains("undefined value"));
    }

    #[test]
    fn volatile_flags_survive_parsing() {
        let module = parse_module(
            r#"
            define void @probe(ptr %p) {
            entry:
              %a = load volatile i32, ptr %p
              store volatile i32 %a, ptr %p
              ret void
            }
            "#,
        )
        .unwrap();
        let func = module.function(module.functions().next().unwrap());
        let bb = func.layout.entry();
        let volatiles = func
            .layout
            .insts(bb)
            .filter(|&inst| func.dfg[inst].is_volatile())
            .count();
        assert_eq!(volatiles, 2);
    }
}
