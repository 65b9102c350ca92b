//! Names the resolver treats as implicit roots of the class hierarchy.

use crate::base::{Namespace, TypeName};

/// The implicit ancestors every class shares.
///
/// `object` is the implicit superclass of classes without one and doubles as
/// the toplevel; `kernel` and `basic_object` contribute constants to every
/// class even when the environment does not spell out `Object`'s own
/// ancestry.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct BuiltinNames {
    pub object: TypeName,
    pub kernel: TypeName,
    pub basic_object: TypeName,
}

impl BuiltinNames {
    pub fn new(object: TypeName, kernel: TypeName, basic_object: TypeName) -> Self {
        Self {
            object,
            kernel,
            basic_object,
        }
    }

    /// `[object, kernel, basic_object]`, closest first.
    pub fn implicit_ancestors(&self) -> [&TypeName; 3] {
        [&self.object, &self.kernel, &self.basic_object]
    }

    pub fn is_builtin(&self, name: &TypeName) -> bool {
        self.implicit_ancestors().contains(&name)
    }
}

impl Default for BuiltinNames {
    fn default() -> Self {
        let root = Namespace::root();
        Self {
            object: TypeName::new(root.clone(), "Object"),
            kernel: TypeName::new(root.clone(), "Kernel"),
            basic_object: TypeName::new(root, "BasicObject"),
        }
    }
}
