//! Built-in validator library.
//!
//! These validators are always registered and cover the common rule kinds.
//! All of them decide synchronously; custom validators may suspend.

mod acceptance;
mod equal_to;
mod func;
mod length;
mod numeric;
mod one_of;
mod pattern;
mod required;

pub use acceptance::Acceptance;
pub use equal_to::EqualTo;
pub use func::Func;
pub use length::{Length, MaxLength, MinLength, RangeLength};
pub use numeric::{Max, Min, Range};
pub use one_of::OneOf;
pub use pattern::Pattern;
pub use required::Required;

use super::ValidatorRegistry;

/// Register all built-in validators with the registry.
pub fn register_builtins(registry: &mut ValidatorRegistry) {
    registry.register(Required);
    registry.register(Acceptance);
    registry.register(Min);
    registry.register(Max);
    registry.register(Range);
    registry.register(Length);
    registry.register(MinLength);
    registry.register(MaxLength);
    registry.register(RangeLength);
    registry.register(OneOf);
    registry.register(EqualTo);
    registry.register(Pattern);
    registry.register(Func);
}
