use std::fmt;

///
/// RelationKind
///
/// The shorthand vocabulary. Polymorphic kinds key their discriminator and
/// foreign-id columns off a morph name; the belongs-to-many family accepts
/// pivot post-configuration.
///

#[remain::sorted]
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum RelationKind {
    BelongsToMany,
    BelongsToOne,
    ManyThroughOne,
    OneToMany,
    OneToOne,
    PolymorphicBelongsTo,
    PolymorphicBelongsToMany,
    PolymorphicBelongsToManyInverse,
    PolymorphicMany,
    PolymorphicOne,
}

impl RelationKind {
    #[must_use]
    pub const fn is_belongs_to_many_family(self) -> bool {
        matches!(
            self,
            Self::BelongsToMany | Self::PolymorphicBelongsToMany | Self::PolymorphicBelongsToManyInverse
        )
    }

    /// Whether the descriptor must carry a target type. PolymorphicBelongsTo
    /// resolves its target from the entity's discriminator attribute instead.
    #[must_use]
    pub const fn requires_target_type(self) -> bool {
        !matches!(self, Self::PolymorphicBelongsTo)
    }

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::BelongsToMany => "belongs_to_many",
            Self::BelongsToOne => "belongs_to_one",
            Self::ManyThroughOne => "many_through_one",
            Self::OneToMany => "one_to_many",
            Self::OneToOne => "one_to_one",
            Self::PolymorphicBelongsTo => "polymorphic_belongs_to",
            Self::PolymorphicBelongsToMany => "polymorphic_belongs_to_many",
            Self::PolymorphicBelongsToManyInverse => "polymorphic_belongs_to_many_inverse",
            Self::PolymorphicMany => "polymorphic_many",
            Self::PolymorphicOne => "polymorphic_one",
        }
    }
}

impl fmt::Display for RelationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

///
/// RelationOptions
///
/// Named parameters whose meaning depends on the kind. Absent optionals are
/// filled with none at resolution time; required ones fail resolution.
///

#[derive(Clone, Debug, Default)]
pub struct RelationOptions {
    pub foreign_key: Option<String>,
    pub local_key: Option<String>,
    pub through: Option<String>,
    pub first_key: Option<String>,
    pub second_key: Option<String>,
    pub table: Option<String>,
    pub other_key: Option<String>,
    pub morph_name: Option<String>,
    pub morph_type_column: Option<String>,
    pub morph_id_column: Option<String>,
    pub pivot_columns: Vec<String>,
    pub with_timestamps: bool,
}

///
/// RelationDescriptor
///
/// One declaration per named relation on an entity type, registered in the
/// type's descriptor table under `name`.
///

#[derive(Clone, Debug)]
pub struct RelationDescriptor {
    pub name: String,
    pub kind: RelationKind,
    pub target_type: Option<String>,
    pub options: RelationOptions,
}

impl RelationDescriptor {
    #[must_use]
    pub fn new(name: impl Into<String>, kind: RelationKind) -> Self {
        Self {
            name: name.into(),
            kind,
            target_type: None,
            options: RelationOptions::default(),
        }
    }

    #[must_use]
    pub fn target(mut self, target_type: impl Into<String>) -> Self {
        self.target_type = Some(target_type.into());
        self
    }

    #[must_use]
    pub fn foreign_key(mut self, key: impl Into<String>) -> Self {
        self.options.foreign_key = Some(key.into());
        self
    }

    #[must_use]
    pub fn local_key(mut self, key: impl Into<String>) -> Self {
        self.options.local_key = Some(key.into());
        self
    }

    #[must_use]
    pub fn through(mut self, entity: impl Into<String>) -> Self {
        self.options.through = Some(entity.into());
        self
    }

    #[must_use]
    pub fn first_key(mut self, key: impl Into<String>) -> Self {
        self.options.first_key = Some(key.into());
        self
    }

    #[must_use]
    pub fn second_key(mut self, key: impl Into<String>) -> Self {
        self.options.second_key = Some(key.into());
        self
    }

    #[must_use]
    pub fn table(mut self, table: impl Into<String>) -> Self {
        self.options.table = Some(table.into());
        self
    }

    #[must_use]
    pub fn other_key(mut self, key: impl Into<String>) -> Self {
        self.options.other_key = Some(key.into());
        self
    }

    #[must_use]
    pub fn morph_name(mut self, name: impl Into<String>) -> Self {
        self.options.morph_name = Some(name.into());
        self
    }

    #[must_use]
    pub fn morph_type_column(mut self, column: impl Into<String>) -> Self {
        self.options.morph_type_column = Some(column.into());
        self
    }

    #[must_use]
    pub fn morph_id_column(mut self, column: impl Into<String>) -> Self {
        self.options.morph_id_column = Some(column.into());
        self
    }

    #[must_use]
    pub fn pivot_columns<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.options.pivot_columns = columns.into_iter().map(Into::into).collect();
        self
    }

    #[must_use]
    pub fn with_timestamps(mut self) -> Self {
        self.options.with_timestamps = true;
        self
    }
}
