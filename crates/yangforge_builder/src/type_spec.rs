//! Type statements as the statement walker hands them over.
//!
//! A [`TypeSpec`] is the unresolved form of a `type` statement. The types
//! phase of the resolver turns every spec that names a typedef or an identity
//! into [`TypeSpec::Resolved`]; everything else can be frozen directly.

use std::sync::Arc;

use yangforge_foundation::{NodeRef, QName, SchemaPath, Status};
use yangforge_model::{
    Bit, BuiltinType, EnumMember, Interval, PatternConstraint, Restrictions, TypeBase,
    TypeDefinition, TypeKind,
};

/// An unresolved `type` statement.
#[derive(Clone, Debug, PartialEq)]
pub enum TypeSpec {
    /// A builtin type, possibly restricted.
    Builtin {
        /// The builtin.
        ty: BuiltinType,
        /// Restrictions declared with the type.
        restrictions: Restrictions,
    },
    /// A reference to a typedef, possibly restricted.
    Named {
        /// The referenced typedef.
        name: NodeRef,
        /// Restrictions declared with the type.
        restrictions: Restrictions,
    },
    /// A `union` of member types.
    Union(Vec<TypeSpec>),
    /// An `enumeration`.
    Enumeration(Vec<EnumMember>),
    /// A `bits` type.
    Bits(Vec<Bit>),
    /// An `identityref` with its base.
    Identityref(NodeRef),
    /// A `leafref` with its path.
    Leafref(String),
    /// An `instance-identifier`.
    InstanceIdentifier {
        /// `require-instance`.
        require_instance: bool,
    },
    /// A frozen type chain.
    Resolved(Arc<TypeDefinition>),
}

impl TypeSpec {
    /// An unrestricted builtin type.
    #[must_use]
    pub fn builtin(ty: BuiltinType) -> Self {
        Self::Builtin {
            ty,
            restrictions: Restrictions::default(),
        }
    }

    /// A type by name: builtin if the name is a builtin keyword without a
    /// prefix, otherwise a typedef reference.
    #[must_use]
    pub fn named(name: NodeRef) -> Self {
        if name.prefix.is_none() {
            if let Some(ty) = BuiltinType::from_name(&name.name) {
                return Self::builtin(ty);
            }
        }
        Self::Named {
            name,
            restrictions: Restrictions::default(),
        }
    }

    /// Adds `range` intervals, e.g. `"1..10 | 20"`.
    #[must_use]
    pub fn with_range(mut self, range: &str) -> Self {
        if let Some(r) = self.restrictions_mut() {
            r.ranges = Interval::parse_list(range);
        }
        self
    }

    /// Adds `length` intervals.
    #[must_use]
    pub fn with_length(mut self, length: &str) -> Self {
        if let Some(r) = self.restrictions_mut() {
            r.lengths = Interval::parse_list(length);
        }
        self
    }

    /// Adds a `pattern`.
    #[must_use]
    pub fn with_pattern(mut self, pattern: &str) -> Self {
        if let Some(r) = self.restrictions_mut() {
            r.patterns.push(PatternConstraint::new(pattern));
        }
        self
    }

    /// Sets `fraction-digits`.
    #[must_use]
    pub fn with_fraction_digits(mut self, digits: u8) -> Self {
        if let Some(r) = self.restrictions_mut() {
            r.fraction_digits = Some(digits);
        }
        self
    }

    fn restrictions_mut(&mut self) -> Option<&mut Restrictions> {
        match self {
            Self::Builtin { restrictions, .. } | Self::Named { restrictions, .. } => {
                Some(restrictions)
            }
            _ => None,
        }
    }

    /// Returns true if the spec refers to a typedef or an identity that the
    /// types phase has to look up.
    #[must_use]
    pub fn needs_resolution(&self) -> bool {
        match self {
            Self::Named { .. } | Self::Identityref(_) => true,
            Self::Union(members) => members.iter().any(Self::needs_resolution),
            _ => false,
        }
    }
}

// =============================================================================
// Freezing
// =============================================================================

/// The parts of one type link, before it gets a name and a path.
#[derive(Clone, Debug)]
pub(crate) struct TypeParts {
    pub base: TypeBase,
    pub restrictions: Restrictions,
    pub kind: TypeKind,
}

impl TypeParts {
    pub fn builtin(ty: BuiltinType, restrictions: Restrictions, kind: TypeKind) -> Self {
        Self {
            base: TypeBase::Builtin(ty),
            restrictions,
            kind,
        }
    }

    /// The parts of a spec that needs no lookups.
    ///
    /// Returns `None` for typedef and identity references.
    pub fn direct(spec: &TypeSpec, path: &SchemaPath) -> Option<Self> {
        let parts = match spec {
            TypeSpec::Builtin { ty, restrictions } => {
                Self::builtin(*ty, restrictions.clone(), TypeKind::Plain)
            }
            TypeSpec::Enumeration(members) => Self::builtin(
                BuiltinType::Enumeration,
                Restrictions::default(),
                TypeKind::Enumeration(members.clone()),
            ),
            TypeSpec::Bits(bits) => Self::builtin(
                BuiltinType::Bits,
                Restrictions::default(),
                TypeKind::Bits(bits.clone()),
            ),
            TypeSpec::Leafref(target) => Self::builtin(
                BuiltinType::Leafref,
                Restrictions::default(),
                TypeKind::Leafref {
                    path: target.clone(),
                },
            ),
            TypeSpec::InstanceIdentifier { require_instance } => Self::builtin(
                BuiltinType::InstanceIdentifier,
                Restrictions::default(),
                TypeKind::InstanceIdentifier {
                    require_instance: *require_instance,
                },
            ),
            TypeSpec::Resolved(def) => Self {
                base: TypeBase::Derived(def.clone()),
                restrictions: Restrictions::default(),
                kind: TypeKind::Plain,
            },
            TypeSpec::Union(members) => {
                let members = members
                    .iter()
                    .map(|m| Self::direct(m, path).map(|p| p.into_link(path)))
                    .collect::<Option<Vec<_>>>()?;
                Self::builtin(
                    BuiltinType::Union,
                    Restrictions::default(),
                    TypeKind::Union(members),
                )
            }
            TypeSpec::Named { .. } | TypeSpec::Identityref(_) => return None,
        };
        Some(parts)
    }

    /// The parts of any spec, with references that were never resolved kept
    /// as [`TypeBase::Unresolved`] links.
    pub fn lenient(spec: &TypeSpec, path: &SchemaPath) -> Self {
        if let Some(parts) = Self::direct(spec, path) {
            return parts;
        }
        match spec {
            TypeSpec::Named { name, restrictions } => Self {
                base: TypeBase::Unresolved(unresolved_qname(name)),
                restrictions: restrictions.clone(),
                kind: TypeKind::Plain,
            },
            TypeSpec::Identityref(base) => Self::builtin(
                BuiltinType::Identityref,
                Restrictions::default(),
                TypeKind::Identityref {
                    base: unresolved_qname(base),
                },
            ),
            TypeSpec::Union(members) => Self::builtin(
                BuiltinType::Union,
                Restrictions::default(),
                TypeKind::Union(
                    members
                        .iter()
                        .map(|m| Self::lenient(m, path).into_link(path))
                        .collect(),
                ),
            ),
            // `direct` handles every other variant.
            _ => Self::builtin(BuiltinType::String, Restrictions::default(), TypeKind::Plain),
        }
    }

    /// Returns the referenced definition when this link adds nothing to it.
    pub fn shared(&self) -> Option<&Arc<TypeDefinition>> {
        match &self.base {
            TypeBase::Derived(def)
                if self.restrictions.is_empty() && matches!(self.kind, TypeKind::Plain) =>
            {
                Some(def)
            }
            _ => None,
        }
    }

    /// The type of a leaf or leaf-list at `path`.
    ///
    /// An unrestricted typedef reference shares the typedef's chain; anything
    /// else becomes an anonymous link named after what it derives from.
    pub fn into_link(self, path: &SchemaPath) -> Arc<TypeDefinition> {
        if let Some(def) = self.shared() {
            return def.clone();
        }
        let qname = match &self.base {
            TypeBase::Builtin(ty) => ty.qname(),
            TypeBase::Derived(def) => def.qname.clone(),
            TypeBase::Unresolved(qname) => qname.clone(),
        };
        Arc::new(TypeDefinition {
            qname,
            path: path.clone(),
            description: None,
            reference: None,
            status: Status::Current,
            units: None,
            default: None,
            base: self.base,
            restrictions: self.restrictions,
            kind: self.kind,
        })
    }
}

fn unresolved_qname(name: &NodeRef) -> QName {
    let qname = QName::unqualified(name.name.as_str());
    match &name.prefix {
        Some(prefix) => qname.with_prefix(prefix.as_str()),
        None => qname,
    }
}
