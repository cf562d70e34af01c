//! Declarative relation shorthand: descriptors, kinds, and the resolver
//! that turns a registered declaration into a host mapper call.
//!
//! Per-kind dispatch, in fixed argument order (`?` marks optional options
//! filled with none when absent):
//!
//! | kind                             | primitive          | arguments                                               |
//! |----------------------------------|--------------------|---------------------------------------------------------|
//! | OneToOne                         | `has_one`          | target, foreign_key?, local_key?                        |
//! | OneToMany                        | `has_many`         | target, foreign_key?, local_key?                        |
//! | ManyThroughOne                   | `has_many_through` | target, through, first_key?, second_key?, local_key?    |
//! | BelongsToOne                     | `belongs_to`       | target, foreign_key, other_key?, name                   |
//! | BelongsToMany                    | `belongs_to_many`  | target, table?, foreign_key?, other_key?, name          |
//! | PolymorphicBelongsTo             | `belongs_to`       | resolved target, morph id column, other_key?, name      |
//! | PolymorphicOne                   | `morph_one`        | target, morph_name, type column, id column, local_key?  |
//! | PolymorphicMany                  | `morph_many`       | target, morph_name, type column, id column, local_key?  |
//! | PolymorphicBelongsToMany         | `morph_to_many`    | target, morph_name, table?, foreign_key?, other_key?    |
//! | PolymorphicBelongsToManyInverse  | `morph_to_many`    | target, morph_name, table?, foreign_key?, other_key?    |

mod descriptor;
mod resolve;

pub use descriptor::{RelationDescriptor, RelationKind, RelationOptions};
pub use resolve::resolve;
