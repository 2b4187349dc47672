use bitflags::bitflags;

bitflags! {
    /// What a UI module descriptor provides.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct ModuleCapabilities: u8 {
        /// Has markup to place in the content region.
        const TEMPLATE = 1 << 0;
        /// Has an initialization hook.
        const INITIALIZE = 1 << 1;
        /// Belongs to the authentication flow.
        const AUTH = 1 << 2;
    }
}

impl ModuleCapabilities {
    /// A module must at least render or initialize.
    #[must_use]
    pub const fn is_usable(self) -> bool {
        self.intersects(Self::TEMPLATE.union(Self::INITIALIZE))
    }
}
