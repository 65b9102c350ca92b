//! Declarations produced by the environment builder.

use crate::base::{Location, TypeName};

use super::types::Type;

/// Whether a module-like declaration is a class or a module.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ModuleKind {
    Class,
    Module,
}

impl ModuleKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ModuleKind::Class => "class",
            ModuleKind::Module => "module",
        }
    }
}

/// A module mixed into a class or module body.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Mixin {
    /// `include M`: inserted after the includer, ahead of its superclass.
    Include(TypeName),
    /// `prepend M`: inserted ahead of the includer itself.
    Prepend(TypeName),
}

impl Mixin {
    pub fn module_name(&self) -> &TypeName {
        match self {
            Mixin::Include(name) | Mixin::Prepend(name) => name,
        }
    }
}

/// `class Name < Super ... end`
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClassDecl {
    pub name: TypeName,
    pub super_class: Option<TypeName>,
    pub mixins: Vec<Mixin>,
    pub location: Option<Location>,
}

impl ClassDecl {
    pub fn new(name: TypeName) -> Self {
        Self {
            name,
            super_class: None,
            mixins: Vec::new(),
            location: None,
        }
    }

    pub fn with_super(mut self, super_class: TypeName) -> Self {
        self.super_class = Some(super_class);
        self
    }

    pub fn include(mut self, module: TypeName) -> Self {
        self.mixins.push(Mixin::Include(module));
        self
    }

    pub fn prepend(mut self, module: TypeName) -> Self {
        self.mixins.push(Mixin::Prepend(module));
        self
    }

    pub fn at(mut self, location: Location) -> Self {
        self.location = Some(location);
        self
    }
}

/// `module Name : SelfType ... end`
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ModuleDecl {
    pub name: TypeName,
    pub self_types: Vec<TypeName>,
    pub mixins: Vec<Mixin>,
    pub location: Option<Location>,
}

impl ModuleDecl {
    pub fn new(name: TypeName) -> Self {
        Self {
            name,
            self_types: Vec::new(),
            mixins: Vec::new(),
            location: None,
        }
    }

    pub fn with_self_type(mut self, self_type: TypeName) -> Self {
        self.self_types.push(self_type);
        self
    }

    pub fn include(mut self, module: TypeName) -> Self {
        self.mixins.push(Mixin::Include(module));
        self
    }

    pub fn prepend(mut self, module: TypeName) -> Self {
        self.mixins.push(Mixin::Prepend(module));
        self
    }

    pub fn at(mut self, location: Location) -> Self {
        self.location = Some(location);
        self
    }
}

/// `NAME: Type`
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ConstantDecl {
    pub name: TypeName,
    pub ty: Type,
    pub location: Option<Location>,
}

impl ConstantDecl {
    pub fn new(name: TypeName, ty: Type) -> Self {
        Self {
            name,
            ty,
            location: None,
        }
    }

    pub fn at(mut self, location: Location) -> Self {
        self.location = Some(location);
        self
    }
}

/// `class Name = Target` or `module Name = Target`
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AliasDecl {
    pub name: TypeName,
    pub target: TypeName,
    pub kind: ModuleKind,
    pub location: Option<Location>,
}

impl AliasDecl {
    pub fn class(name: TypeName, target: TypeName) -> Self {
        Self {
            name,
            target,
            kind: ModuleKind::Class,
            location: None,
        }
    }

    pub fn module(name: TypeName, target: TypeName) -> Self {
        Self {
            name,
            target,
            kind: ModuleKind::Module,
            location: None,
        }
    }

    pub fn at(mut self, location: Location) -> Self {
        self.location = Some(location);
        self
    }
}

/// `interface _Name ... end`
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InterfaceDecl {
    pub name: TypeName,
    pub location: Option<Location>,
}

/// `type name = Type`
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TypeAliasDecl {
    pub name: TypeName,
    pub ty: Type,
    pub location: Option<Location>,
}

/// Any declaration the environment accepts.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Declaration {
    Class(ClassDecl),
    Module(ModuleDecl),
    Constant(ConstantDecl),
    Alias(AliasDecl),
    Interface(InterfaceDecl),
    TypeAlias(TypeAliasDecl),
}

impl Declaration {
    pub fn name(&self) -> &TypeName {
        match self {
            Declaration::Class(decl) => &decl.name,
            Declaration::Module(decl) => &decl.name,
            Declaration::Constant(decl) => &decl.name,
            Declaration::Alias(decl) => &decl.name,
            Declaration::Interface(decl) => &decl.name,
            Declaration::TypeAlias(decl) => &decl.name,
        }
    }

    pub fn location(&self) -> Option<Location> {
        match self {
            Declaration::Class(decl) => decl.location,
            Declaration::Module(decl) => decl.location,
            Declaration::Constant(decl) => decl.location,
            Declaration::Alias(decl) => decl.location,
            Declaration::Interface(decl) => decl.location,
            Declaration::TypeAlias(decl) => decl.location,
        }
    }

    /// Names this declaration points at, which must be absolute as well.
    pub(crate) fn references(&self) -> Vec<&TypeName> {
        match self {
            Declaration::Class(decl) => decl
                .super_class
                .iter()
                .chain(decl.mixins.iter().map(Mixin::module_name))
                .collect(),
            Declaration::Module(decl) => decl
                .self_types
                .iter()
                .chain(decl.mixins.iter().map(Mixin::module_name))
                .collect(),
            Declaration::Alias(decl) => vec![&decl.target],
            Declaration::Constant(_) | Declaration::Interface(_) | Declaration::TypeAlias(_) => {
                Vec::new()
            }
        }
    }
}

impl From<ClassDecl> for Declaration {
    fn from(decl: ClassDecl) -> Self {
        Declaration::Class(decl)
    }
}

impl From<ModuleDecl> for Declaration {
    fn from(decl: ModuleDecl) -> Self {
        Declaration::Module(decl)
    }
}

impl From<ConstantDecl> for Declaration {
    fn from(decl: ConstantDecl) -> Self {
        Declaration::Constant(decl)
    }
}

impl From<AliasDecl> for Declaration {
    fn from(decl: AliasDecl) -> Self {
        Declaration::Alias(decl)
    }
}

impl From<InterfaceDecl> for Declaration {
    fn from(decl: InterfaceDecl) -> Self {
        Declaration::Interface(decl)
    }
}

impl From<TypeAliasDecl> for Declaration {
    fn from(decl: TypeAliasDecl) -> Self {
        Declaration::TypeAlias(decl)
    }
}
