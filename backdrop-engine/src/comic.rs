// comic.rs - Flip-book pager
//
// Page 0 is the cover; pages 1..=n are the comic panels. Flipping page i
// turns its element over, revealing i + 1.

use serde::Deserialize;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ComicPage {
    pub video: String,
    pub text: String,
}

/// What the view must do for one page turn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Flip {
    /// Element gaining (next) or losing (prev) the `flipped` class
    pub element: String,
    pub flipped: bool,
    /// Element whose video should start playing
    pub play: String,
}

#[derive(Debug, Clone)]
pub struct Book {
    pages: Vec<ComicPage>,
    current: usize,
}

impl Book {
    pub fn new(pages: Vec<ComicPage>) -> Self {
        Self { pages, current: 0 }
    }

    pub fn pages(&self) -> &[ComicPage] { &self.pages }

    pub fn current(&self) -> usize { self.current }

    /// Cover included
    pub fn total(&self) -> usize {
        self.pages.len() + 1
    }

    pub fn can_prev(&self) -> bool {
        self.current > 0
    }

    pub fn can_next(&self) -> bool {
        self.current + 1 < self.total()
    }

    pub fn next(&mut self) -> Option<Flip> {
        if !self.can_next() {
            return None;
        }
        let flip = Flip {
            element: element_id(self.current),
            flipped: true,
            play: element_id(self.current + 1),
        };
        self.current += 1;
        Some(flip)
    }

    pub fn prev(&mut self) -> Option<Flip> {
        if !self.can_prev() {
            return None;
        }
        self.current -= 1;
        let id = element_id(self.current);
        Some(Flip { element: id.clone(), flipped: false, play: id })
    }

    /// Earlier pages stack above later ones
    pub fn z_index(&self, page: usize) -> usize {
        self.total().saturating_sub(page)
    }

    pub fn on_key(&mut self, key: &str) -> Option<Flip> {
        match key {
            "ArrowRight" => self.next(),
            "ArrowLeft" => self.prev(),
            _ => None,
        }
    }
}

pub fn element_id(page: usize) -> String {
    if page == 0 { "cover".into() } else { format!("page-{page}") }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn book(n: usize) -> Book {
        Book::new(
            (1..=n)
                .map(|i| ComicPage { video: format!("Images/comics/page{i}.mp4"), text: format!("panel {i}") })
                .collect(),
        )
    }

    #[test]
    fn walks_forward_and_back() {
        let mut b = book(2);
        assert!(!b.can_prev());
        assert_eq!(b.next(), Some(Flip { element: "cover".into(), flipped: true, play: "page-1".into() }));
        assert_eq!(b.next(), Some(Flip { element: "page-1".into(), flipped: true, play: "page-2".into() }));
        assert!(!b.can_next());
        assert_eq!(b.next(), None);
        assert_eq!(b.prev(), Some(Flip { element: "page-1".into(), flipped: false, play: "page-1".into() }));
        assert_eq!(b.current(), 1);
    }

    #[test]
    fn keys_map_to_turns() {
        let mut b = book(1);
        assert!(b.on_key("ArrowLeft").is_none());
        assert!(b.on_key("ArrowRight").is_some());
        assert!(b.on_key("Enter").is_none());
        assert_eq!(b.current(), 1);
    }

    #[test]
    fn stacking_order() {
        let b = book(4);
        assert_eq!(b.z_index(0), 5);
        assert_eq!(b.z_index(4), 1);
    }

    #[test]
    fn empty_book_only_cover() {
        let mut b = book(0);
        assert_eq!(b.total(), 1);
        assert!(b.next().is_none());
    }
}
