//! Lexical contexts: the namespaces enclosing a reference.

use std::fmt;
use std::sync::Arc;

use crate::base::TypeName;

/// An immutable chain of enclosing namespaces, innermost last when written
/// and innermost first when walked.
///
/// ```text
/// module A          # Context::root().push(::A)
///   class B         # ....push(::A::B)
///     X             # <- resolved with context [::A, ::A::B]
///   end
/// end
/// ```
///
/// The root context (no enclosing namespace) is the toplevel. Contexts share
/// their outer links, so extending one never affects another.
#[derive(Clone, Default, PartialEq, Eq, Hash)]
pub struct Context(Option<Arc<Frame>>);

#[derive(PartialEq, Eq, Hash)]
struct Frame {
    outer: Context,
    namespace: TypeName,
}

impl Context {
    /// The toplevel context.
    pub fn root() -> Self {
        Self(None)
    }

    /// A context one level deeper, nested in `namespace`.
    pub fn push(&self, namespace: TypeName) -> Context {
        Context(Some(Arc::new(Frame {
            outer: self.clone(),
            namespace,
        })))
    }

    /// Build a context from namespaces listed outermost first.
    pub fn from_namespaces<I>(namespaces: I) -> Context
    where
        I: IntoIterator<Item = TypeName>,
    {
        namespaces
            .into_iter()
            .fold(Context::root(), |context, namespace| context.push(namespace))
    }

    pub fn is_root(&self) -> bool {
        self.0.is_none()
    }

    /// The namespace the reference physically occurs in.
    pub fn innermost(&self) -> Option<&TypeName> {
        self.0.as_deref().map(|frame| &frame.namespace)
    }

    /// The context enclosing the innermost namespace.
    pub fn outer(&self) -> Option<&Context> {
        self.0.as_deref().map(|frame| &frame.outer)
    }

    /// Enclosing namespaces, innermost first.
    pub fn frames(&self) -> impl Iterator<Item = &TypeName> {
        std::iter::successors(self.0.as_deref(), |frame| frame.outer.0.as_deref())
            .map(|frame| &frame.namespace)
    }

    pub fn depth(&self) -> usize {
        self.frames().count()
    }
}

impl fmt::Debug for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut frames: Vec<_> = self.frames().collect();
        frames.reverse();
        f.write_str("[")?;
        for (i, name) in frames.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{name}")?;
        }
        f.write_str("]")
    }
}
