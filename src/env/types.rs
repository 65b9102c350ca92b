//! Type expressions attached to constants.
//!
//! Only the shapes the resolver hands back to callers are modeled; the
//! environment builder is responsible for producing them from signature text.

use std::fmt;

use smol_str::SmolStr;

use crate::base::TypeName;

/// Built-in type keywords.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BaseType {
    Untyped,
    Bool,
    Nil,
    Void,
    Top,
    Bottom,
    SelfType,
    Instance,
    Class,
}

impl BaseType {
    pub fn as_str(self) -> &'static str {
        match self {
            BaseType::Untyped => "untyped",
            BaseType::Bool => "bool",
            BaseType::Nil => "nil",
            BaseType::Void => "void",
            BaseType::Top => "top",
            BaseType::Bottom => "bot",
            BaseType::SelfType => "self",
            BaseType::Instance => "instance",
            BaseType::Class => "class",
        }
    }
}

/// A type expression.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Type {
    Base(BaseType),
    /// `singleton(::Foo)`: the class object itself. Every class/module child
    /// in a constant table carries this type.
    ClassSingleton(TypeName),
    /// `::Foo[args]`
    ClassInstance { name: TypeName, args: Vec<Type> },
    /// `::_Foo[args]`
    Interface { name: TypeName, args: Vec<Type> },
    /// `::foo[args]`
    Alias { name: TypeName, args: Vec<Type> },
    Optional(Box<Type>),
    Union(Vec<Type>),
    Tuple(Vec<Type>),
    /// A literal such as `1`, `:sym` or `"str"`, kept as written.
    Literal(SmolStr),
}

impl Type {
    pub fn singleton(name: TypeName) -> Self {
        Type::ClassSingleton(name)
    }

    pub fn instance(name: TypeName) -> Self {
        Type::ClassInstance {
            name,
            args: Vec::new(),
        }
    }

    pub fn optional(self) -> Self {
        Type::Optional(Box::new(self))
    }
}

fn write_args(f: &mut fmt::Formatter<'_>, args: &[Type]) -> fmt::Result {
    if args.is_empty() {
        return Ok(());
    }
    f.write_str("[")?;
    write_joined(f, args, ", ")?;
    f.write_str("]")
}

fn write_joined(f: &mut fmt::Formatter<'_>, types: &[Type], sep: &str) -> fmt::Result {
    for (i, ty) in types.iter().enumerate() {
        if i > 0 {
            f.write_str(sep)?;
        }
        write!(f, "{ty}")?;
    }
    Ok(())
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Type::Base(base) => f.write_str(base.as_str()),
            Type::ClassSingleton(name) => write!(f, "singleton({name})"),
            Type::ClassInstance { name, args }
            | Type::Interface { name, args }
            | Type::Alias { name, args } => {
                write!(f, "{name}")?;
                write_args(f, args)
            }
            Type::Optional(inner) => match inner.as_ref() {
                Type::Union(_) => write!(f, "({inner})?"),
                _ => write!(f, "{inner}?"),
            },
            Type::Union(types) => write_joined(f, types, " | "),
            Type::Tuple(types) => {
                f.write_str("[")?;
                write_joined(f, types, ", ")?;
                f.write_str("]")
            }
            Type::Literal(text) => f.write_str(text),
        }
    }
}
