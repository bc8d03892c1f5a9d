//! Menu item IDs for event handling.

pub const OPEN_DEVTOOLS: &str = "open_devtools";
pub const RELOAD: &str = "reload";
pub const QUIT: &str = "quit";

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn ids_are_unique() {
        const ALL: [&str; 3] = [OPEN_DEVTOOLS, RELOAD, QUIT];
        let unique: HashSet<_> = ALL.iter().collect();
        assert_eq!(unique.len(), ALL.len());
    }
}
