// lifecycle.rs - Liveness for fire-and-forget loads
//
// A load captures a Liveness token when it starts and checks it when it
// resolves. Once the owning Mount is gone the result is dropped on the floor.

use std::cell::Cell;
use std::rc::Rc;

pub struct Mount {
    alive: Rc<Cell<bool>>,
}

impl Mount {
    pub fn new() -> Self {
        Self { alive: Rc::new(Cell::new(true)) }
    }

    pub fn token(&self) -> Liveness {
        Liveness(Rc::clone(&self.alive))
    }

    pub fn unmount(&self) {
        self.alive.set(false);
    }

    pub fn is_mounted(&self) -> bool {
        self.alive.get()
    }
}

impl Default for Mount {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for Mount {
    fn drop(&mut self) {
        self.alive.set(false);
    }
}

#[derive(Clone)]
pub struct Liveness(Rc<Cell<bool>>);

impl Liveness {
    pub fn is_alive(&self) -> bool {
        self.0.get()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextureState {
    Pending,
    Ready,
    /// Left untextured for good; loads are never retried
    Failed,
}

#[derive(Debug, Clone)]
pub struct TextureSlot {
    pub url: String,
    pub state: TextureState,
}

#[derive(Debug, Clone, Default)]
pub struct TextureTable {
    slots: Vec<TextureSlot>,
}

impl TextureTable {
    pub fn new(urls: Vec<String>) -> Self {
        let slots = urls.into_iter().map(|url| TextureSlot { url, state: TextureState::Pending }).collect();
        Self { slots }
    }

    pub fn slots(&self) -> &[TextureSlot] { &self.slots }

    pub fn is_ready(&self, slot: usize) -> bool {
        self.slots.get(slot).is_some_and(|s| s.state == TextureState::Ready)
    }

    /// Record a finished load. Returns false when the result was discarded
    /// because the owner is gone, the slot is unknown, or it already resolved.
    pub fn resolve(&mut self, token: &Liveness, slot: usize, ok: bool) -> bool {
        if !token.is_alive() {
            log::debug!("texture {slot} resolved after unmount, ignored");
            return false;
        }
        let Some(entry) = self.slots.get_mut(slot) else { return false };
        if entry.state != TextureState::Pending {
            return false;
        }
        entry.state = if ok { TextureState::Ready } else { TextureState::Failed };
        if !ok {
            log::warn!("texture {} failed to load, staying untextured", entry.url);
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dropped_mount_kills_token() {
        let mount = Mount::new();
        let token = mount.token();
        assert!(token.is_alive());
        drop(mount);
        assert!(!token.is_alive());
    }

    #[test]
    fn late_load_is_ignored() {
        let mut table = TextureTable::new(vec!["a.jpg".into()]);
        let mount = Mount::new();
        let token = mount.token();
        mount.unmount();
        assert!(!table.resolve(&token, 0, true));
        assert!(!table.is_ready(0));
    }

    #[test]
    fn resolves_once() {
        let mut table = TextureTable::new(vec!["a.jpg".into(), "b.jpg".into()]);
        let mount = Mount::new();
        assert!(table.resolve(&mount.token(), 1, false));
        assert!(!table.resolve(&mount.token(), 1, true));
        assert_eq!(table.slots()[1].state, TextureState::Failed);
        assert!(table.resolve(&mount.token(), 0, true));
        assert!(table.is_ready(0));
        assert!(!table.resolve(&mount.token(), 9, true));
    }
}
