//! Stable type tags for attributes, effects and multipliers.
//!
//! Classes replace runtime reflection: every attribute and effect instance
//! carries the tag it was created from, and "subtype of" queries walk a
//! parent table declared once at registry build time.

use std::borrow::Cow;
use std::collections::HashMap;
use std::fmt;
use std::hash::Hash;

macro_rules! class_tag {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
        #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
        #[cfg_attr(feature = "serde", serde(transparent))]
        pub struct $name(Cow<'static, str>);

        impl $name {
            /// Creates a tag from a static string (usable in `const` items).
            pub const fn from_static(name: &'static str) -> Self {
                Self(Cow::Borrowed(name))
            }

            pub fn new(name: impl Into<Cow<'static, str>>) -> Self {
                Self(name.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&'static str> for $name {
            fn from(name: &'static str) -> Self {
                Self::from_static(name)
            }
        }

        impl From<String> for $name {
            fn from(name: String) -> Self {
                Self(Cow::Owned(name))
            }
        }
    };
}

class_tag!(
    /// Type tag of an attribute (e.g. `health`, `stamina`).
    AttributeClass
);

class_tag!(
    /// Type tag of an effect (e.g. `poison`, `regeneration`).
    EffectClass
);

class_tag!(
    /// Unique id of a multiplier within one attribute.
    MultiplierId
);

class_tag!(
    /// Unique id of a modifier within one effect.
    ModifierId
);

/// Declared "is-subtype-of" relation for one family of classes.
///
/// Each class has at most one parent. Classes never declared are roots.
#[derive(Clone, Debug)]
pub struct ClassHierarchy<C> {
    parents: HashMap<C, C>,
}

impl<C> Default for ClassHierarchy<C> {
    fn default() -> Self {
        Self {
            parents: HashMap::new(),
        }
    }
}

impl<C> ClassHierarchy<C>
where
    C: Clone + Eq + Hash,
{
    /// Chains longer than this are treated as cyclic and stop matching.
    const MAX_DEPTH: usize = 32;

    pub fn new() -> Self {
        Self::default()
    }

    /// Declares `child` as a direct subtype of `parent`, replacing any previous parent.
    pub fn declare(&mut self, child: C, parent: C) {
        self.parents.insert(child, parent);
    }

    pub fn parent(&self, class: &C) -> Option<&C> {
        self.parents.get(class)
    }

    /// Returns true if `class` equals `ancestor` or descends from it.
    pub fn is_a(&self, class: &C, ancestor: &C) -> bool {
        let mut current = class;
        for _ in 0..Self::MAX_DEPTH {
            if current == ancestor {
                return true;
            }
            match self.parents.get(current) {
                Some(parent) => current = parent,
                None => return false,
            }
        }
        false
    }
}
