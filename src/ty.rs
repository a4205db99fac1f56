// Copyright (c) 2017-2021 Fabian Schuiki

//! Types of values.

pub use self::TypeKind::*;
use crate::util::write_implode;
use std::sync::Arc;

/// A type.
pub type Type = Arc<TypeKind>;

/// The different kinds of types.
#[derive(Debug, PartialEq, Eq, Hash)]
pub enum TypeKind {
    /// The `void` type.
    VoidType,
    /// Integer types like `i32`.
    IntType(usize),
    /// Floating-point types `f32` and `f64`.
    FloatType(usize),
    /// The opaque pointer type `ptr`.
    PointerType,
    /// Vector types like `<4 x i32>`.
    VectorType(usize, Type),
    /// Array types like `[4 x i32]`.
    ArrayType(usize, Type),
    /// Struct types like `{i8, i32}`.
    StructType(Vec<Type>),
}

impl std::fmt::Display for TypeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match *self {
            VoidType => write!(f, "void"),
            IntType(w) => write!(f, "i{}", w),
            FloatType(w) => write!(f, "f{}", w),
            PointerType => write!(f, "ptr"),
            VectorType(l, ref ty) => write!(f, "<{} x {}>", l, ty),
            ArrayType(l, ref ty) => write!(f, "[{} x {}]", l, ty),
            StructType(ref tys) => {
                write!(f, "{{")?;
                write_implode(f, ", ", tys.iter())?;
                write!(f, "}}")?;
                Ok(())
            }
        }
    }
}

impl TypeKind {
    /// Check if this is the void type.
    pub fn is_void(&self) -> bool {
        matches!(*self, VoidType)
    }

    /// Check if this is an integer type.
    pub fn is_int(&self) -> bool {
        matches!(*self, IntType(_))
    }

    /// Check if this is a floating-point type.
    pub fn is_float(&self) -> bool {
        matches!(*self, FloatType(_))
    }

    /// Check if this is the pointer type.
    pub fn is_pointer(&self) -> bool {
        matches!(*self, PointerType)
    }

    /// Check if this is a vector type.
    pub fn is_vector(&self) -> bool {
        matches!(*self, VectorType(..))
    }

    /// Unwrap the width of an integer type, or panic.
    pub fn unwrap_int(&self) -> usize {
        match *self {
            IntType(w) => w,
            _ => panic!("unwrap_int called on {}", self),
        }
    }

    /// Unwrap the width of a floating-point type, or panic.
    pub fn unwrap_float(&self) -> usize {
        match *self {
            FloatType(w) => w,
            _ => panic!("unwrap_float called on {}", self),
        }
    }

    /// Unwrap the length and element type of a vector type, or panic.
    pub fn unwrap_vector(&self) -> (usize, &Type) {
        match *self {
            VectorType(l, ref ty) => (l, ty),
            _ => panic!("unwrap_vector called on {}", self),
        }
    }

    /// Resolve the type of the field at `index` within an aggregate.
    ///
    /// Returns `None` if the type is not an aggregate or the index is out of
    /// range.
    pub fn field(&self, index: usize) -> Option<&Type> {
        match *self {
            ArrayType(l, ref ty) if index < l => Some(ty),
            StructType(ref tys) => tys.get(index),
            _ => None,
        }
    }
}

/// Create a void type.
pub fn void_ty() -> Type {
    Type::new(VoidType)
}

/// Create an integer type of the requested width.
pub fn int_ty(width: usize) -> Type {
    Type::new(IntType(width))
}

/// Create a floating-point type of the requested width.
pub fn float_ty(width: usize) -> Type {
    assert!(width == 32 || width == 64, "no f{} type", width);
    Type::new(FloatType(width))
}

/// Create a pointer type.
pub fn pointer_ty() -> Type {
    Type::new(PointerType)
}

/// Create a vector type of the requested length and element type.
pub fn vector_ty(length: usize, element: Type) -> Type {
    Type::new(VectorType(length, element))
}

/// Create an array type of the requested length and element type.
pub fn array_ty(length: usize, element: Type) -> Type {
    Type::new(ArrayType(length, element))
}

/// Create a struct type with the requested fields.
pub fn struct_ty(fields: Vec<Type>) -> Type {
    Type::new(StructType(fields))
}
