//! Type definitions.
//!
//! A [`TypeDefinition`] is one link of a typedef chain. Each link either sits
//! directly on a builtin type or derives from another `TypeDefinition`, which
//! it holds by reference (`Arc`). Restrictions attach at each link and are
//! looked up along the chain rather than copied into derived types.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use yangforge_foundation::{QName, SchemaPath, Status};

/// Namespace of the YANG builtin types.
pub const BUILTIN_NAMESPACE: &str = "urn:ietf:params:xml:ns:yang:1";

// =============================================================================
// BuiltinType
// =============================================================================

/// The primitive types every typedef chain ends in.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum BuiltinType {
    /// `int8`
    Int8,
    /// `int16`
    Int16,
    /// `int32`
    Int32,
    /// `int64`
    Int64,
    /// `uint8`
    Uint8,
    /// `uint16`
    Uint16,
    /// `uint32`
    Uint32,
    /// `uint64`
    Uint64,
    /// `decimal64`
    Decimal64,
    /// `string`
    String,
    /// `boolean`
    Boolean,
    /// `empty`
    Empty,
    /// `binary`
    Binary,
    /// `bits`
    Bits,
    /// `enumeration`
    Enumeration,
    /// `union`
    Union,
    /// `identityref`
    Identityref,
    /// `instance-identifier`
    InstanceIdentifier,
    /// `leafref`
    Leafref,
}

impl BuiltinType {
    /// All builtin types.
    pub const ALL: [BuiltinType; 19] = [
        Self::Int8,
        Self::Int16,
        Self::Int32,
        Self::Int64,
        Self::Uint8,
        Self::Uint16,
        Self::Uint32,
        Self::Uint64,
        Self::Decimal64,
        Self::String,
        Self::Boolean,
        Self::Empty,
        Self::Binary,
        Self::Bits,
        Self::Enumeration,
        Self::Union,
        Self::Identityref,
        Self::InstanceIdentifier,
        Self::Leafref,
    ];

    /// Looks up a builtin type by its keyword.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.name() == name)
    }

    /// The keyword of this type.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Int8 => "int8",
            Self::Int16 => "int16",
            Self::Int32 => "int32",
            Self::Int64 => "int64",
            Self::Uint8 => "uint8",
            Self::Uint16 => "uint16",
            Self::Uint32 => "uint32",
            Self::Uint64 => "uint64",
            Self::Decimal64 => "decimal64",
            Self::String => "string",
            Self::Boolean => "boolean",
            Self::Empty => "empty",
            Self::Binary => "binary",
            Self::Bits => "bits",
            Self::Enumeration => "enumeration",
            Self::Union => "union",
            Self::Identityref => "identityref",
            Self::InstanceIdentifier => "instance-identifier",
            Self::Leafref => "leafref",
        }
    }

    /// Returns true for the integer types.
    #[must_use]
    pub const fn is_integer(self) -> bool {
        matches!(
            self,
            Self::Int8
                | Self::Int16
                | Self::Int32
                | Self::Int64
                | Self::Uint8
                | Self::Uint16
                | Self::Uint32
                | Self::Uint64
        )
    }

    /// The qualified name of this builtin.
    #[must_use]
    pub fn qname(self) -> QName {
        QName::new(BUILTIN_NAMESPACE, None, self.name())
    }
}

impl fmt::Display for BuiltinType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// =============================================================================
// Restrictions
// =============================================================================

/// One `min..max` interval of a `range` or `length` statement.
///
/// Bounds are kept textual (`min`, `max`, or a number) since their numeric
/// domain depends on the builtin type at the end of the chain.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Interval {
    /// Lower bound.
    pub min: String,
    /// Upper bound.
    pub max: String,
}

impl Interval {
    /// Creates an interval.
    #[must_use]
    pub fn new(min: impl Into<String>, max: impl Into<String>) -> Self {
        Self {
            min: min.into(),
            max: max.into(),
        }
    }

    /// Parses `a..b | c | d..e` into intervals.
    #[must_use]
    pub fn parse_list(text: &str) -> Vec<Self> {
        text.split('|')
            .map(str::trim)
            .filter(|part| !part.is_empty())
            .map(|part| match part.split_once("..") {
                Some((min, max)) => Self::new(min.trim(), max.trim()),
                None => Self::new(part, part),
            })
            .collect()
    }
}

/// A `pattern` restriction.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PatternConstraint {
    /// The regular expression.
    pub regex: String,
    /// `error-message` substatement.
    pub error_message: Option<String>,
}

impl PatternConstraint {
    /// Creates a pattern restriction.
    #[must_use]
    pub fn new(regex: impl Into<String>) -> Self {
        Self {
            regex: regex.into(),
            error_message: None,
        }
    }
}

/// Restrictions declared at one link of a type chain.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Restrictions {
    /// `range` intervals.
    pub ranges: Vec<Interval>,
    /// `length` intervals.
    pub lengths: Vec<Interval>,
    /// `pattern` statements.
    pub patterns: Vec<PatternConstraint>,
    /// `fraction-digits`, for decimal64.
    pub fraction_digits: Option<u8>,
}

impl Restrictions {
    /// Returns true if nothing is restricted.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ranges.is_empty()
            && self.lengths.is_empty()
            && self.patterns.is_empty()
            && self.fraction_digits.is_none()
    }
}

/// A member of an enumeration.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct EnumMember {
    /// The enum name.
    pub name: String,
    /// The assigned value.
    pub value: i32,
    /// Optional description.
    pub description: Option<String>,
    /// Member status.
    pub status: Status,
}

/// A bit of a `bits` type.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Bit {
    /// The bit name.
    pub name: String,
    /// The bit position.
    pub position: u32,
    /// Optional description.
    pub description: Option<String>,
}

// =============================================================================
// TypeDefinition
// =============================================================================

/// What a type definition derives from.
#[derive(Clone, Debug)]
pub enum TypeBase {
    /// Sits directly on a builtin type.
    Builtin(BuiltinType),
    /// Derives from another definition.
    Derived(Arc<TypeDefinition>),
    /// Names a typedef that has not been resolved yet.
    ///
    /// Only appears in modules built outside of a compilation; a compiled
    /// [`SchemaSet`](crate::SchemaSet) never contains it.
    Unresolved(QName),
}

/// Kind-specific payload declared at a link.
#[derive(Clone, Debug, PartialEq, Default)]
pub enum TypeKind {
    /// Nothing beyond restrictions.
    #[default]
    Plain,
    /// Union members, in declaration order.
    Union(Vec<Arc<TypeDefinition>>),
    /// Enumeration members.
    Enumeration(Vec<EnumMember>),
    /// Bits.
    Bits(Vec<Bit>),
    /// Identityref with its resolved base identity.
    Identityref {
        /// Qualified name of the base identity.
        base: QName,
    },
    /// Leafref with its path expression.
    Leafref {
        /// The XPath of the referenced leaf.
        path: String,
    },
    /// Instance-identifier.
    InstanceIdentifier {
        /// `require-instance`.
        require_instance: bool,
    },
}

/// One link of a type chain.
#[derive(Clone, Debug)]
pub struct TypeDefinition {
    /// Name of the typedef, or of the builtin for anonymous links.
    pub qname: QName,
    /// Schema path of the typedef or of the node declaring the type.
    pub path: SchemaPath,
    /// Optional description.
    pub description: Option<String>,
    /// Optional reference.
    pub reference: Option<String>,
    /// Status.
    pub status: Status,
    /// `units` declared at this link.
    pub units: Option<String>,
    /// `default` declared at this link.
    pub default: Option<String>,
    /// What this link derives from.
    pub base: TypeBase,
    /// Restrictions declared at this link.
    pub restrictions: Restrictions,
    /// Kind-specific payload declared at this link.
    pub kind: TypeKind,
}

impl TypeDefinition {
    /// Creates a plain builtin type with no restrictions.
    #[must_use]
    pub fn builtin(ty: BuiltinType) -> Self {
        let qname = ty.qname();
        Self {
            path: SchemaPath::root().child(qname.clone()),
            qname,
            description: None,
            reference: None,
            status: Status::Current,
            units: None,
            default: None,
            base: TypeBase::Builtin(ty),
            restrictions: Restrictions::default(),
            kind: TypeKind::Plain,
        }
    }

    /// The builtin type at the end of the chain, or `None` if the chain
    /// ends in an unresolved reference.
    #[must_use]
    pub fn builtin_type(&self) -> Option<BuiltinType> {
        let mut current = self;
        loop {
            match &current.base {
                TypeBase::Builtin(ty) => return Some(*ty),
                TypeBase::Derived(parent) => current = parent,
                TypeBase::Unresolved(_) => return None,
            }
        }
    }

    /// Returns true if every link of the chain, and every union member,
    /// is resolved.
    #[must_use]
    pub fn is_resolved(&self) -> bool {
        self.chain().all(|link| {
            let members_resolved = match &link.kind {
                TypeKind::Union(members) => members.iter().all(|m| m.is_resolved()),
                _ => true,
            };
            members_resolved && !matches!(link.base, TypeBase::Unresolved(_))
        })
    }

    /// The definition this one derives from, if any.
    #[must_use]
    pub fn parent(&self) -> Option<&Arc<TypeDefinition>> {
        match &self.base {
            TypeBase::Builtin(_) | TypeBase::Unresolved(_) => None,
            TypeBase::Derived(parent) => Some(parent),
        }
    }

    /// The link moved from the node at `from` to the node at `to`.
    ///
    /// Only links declared at `from` (anonymous links of a leaf, and their
    /// union members) move; typedef links stay shared.
    #[must_use]
    pub fn relocated(self: &Arc<Self>, from: &SchemaPath, to: &SchemaPath) -> Arc<Self> {
        if self.path != *from {
            return Arc::clone(self);
        }
        let mut link = (**self).clone();
        link.path = to.clone();
        if let TypeKind::Union(members) = &mut link.kind {
            for member in members.iter_mut() {
                *member = member.relocated(from, to);
            }
        }
        Arc::new(link)
    }

    /// Iterates over the chain, starting with `self`.
    pub fn chain(&self) -> impl Iterator<Item = &TypeDefinition> {
        std::iter::successors(Some(self), |t| t.parent().map(AsRef::as_ref))
    }

    /// Number of links in the chain, counting `self`.
    #[must_use]
    pub fn depth(&self) -> usize {
        self.chain().count()
    }

    /// The nearest `range` along the chain.
    #[must_use]
    pub fn effective_ranges(&self) -> &[Interval] {
        self.chain()
            .map(|t| t.restrictions.ranges.as_slice())
            .find(|r| !r.is_empty())
            .unwrap_or_default()
    }

    /// The nearest `length` along the chain.
    #[must_use]
    pub fn effective_lengths(&self) -> &[Interval] {
        self.chain()
            .map(|t| t.restrictions.lengths.as_slice())
            .find(|r| !r.is_empty())
            .unwrap_or_default()
    }

    /// Every `pattern` along the chain; a value must match all of them.
    #[must_use]
    pub fn effective_patterns(&self) -> Vec<&PatternConstraint> {
        self.chain()
            .flat_map(|t| t.restrictions.patterns.iter())
            .collect()
    }

    /// The nearest `fraction-digits` along the chain.
    #[must_use]
    pub fn effective_fraction_digits(&self) -> Option<u8> {
        self.chain().find_map(|t| t.restrictions.fraction_digits)
    }

    /// The nearest `units` along the chain.
    #[must_use]
    pub fn effective_units(&self) -> Option<&str> {
        self.chain().find_map(|t| t.units.as_deref())
    }

    /// The nearest `default` along the chain.
    #[must_use]
    pub fn effective_default(&self) -> Option<&str> {
        self.chain().find_map(|t| t.default.as_deref())
    }

    /// The nearest kind-specific payload along the chain.
    #[must_use]
    pub fn effective_kind(&self) -> &TypeKind {
        self.chain()
            .map(|t| &t.kind)
            .find(|k| !matches!(k, TypeKind::Plain))
            .unwrap_or(&TypeKind::Plain)
    }

    /// Union members, if the chain ends in a union.
    #[must_use]
    pub fn union_members(&self) -> Option<&[Arc<TypeDefinition>]> {
        match self.effective_kind() {
            TypeKind::Union(members) => Some(members),
            _ => None,
        }
    }

    /// Base identity, if the chain ends in an identityref.
    #[must_use]
    pub fn identityref_base(&self) -> Option<&QName> {
        match self.effective_kind() {
            TypeKind::Identityref { base } => Some(base),
            _ => None,
        }
    }
}

impl PartialEq for TypeDefinition {
    fn eq(&self, other: &Self) -> bool {
        self.qname == other.qname && self.path == other.path
    }
}

impl Eq for TypeDefinition {}

impl Hash for TypeDefinition {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.qname.hash(state);
        self.path.hash(state);
    }
}
