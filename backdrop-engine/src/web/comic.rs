// comic.rs - Flip-book DOM

use std::cell::RefCell;
use std::rc::Rc;

use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{Element, HtmlButtonElement, HtmlElement, HtmlMediaElement, HtmlVideoElement, KeyboardEvent};

use super::{create, listen, play_media};
use crate::comic::{element_id, Book, ComicPage, Flip};

#[wasm_bindgen]
pub struct ComicViewer {
    view: Rc<View>,
}

struct View {
    book: RefCell<Book>,
    prev: HtmlButtonElement,
    next: HtmlButtonElement,
}

#[wasm_bindgen]
impl ComicViewer {
    /// Append one page per entry of `pages_json` after the cover already in
    /// `#book_id`, then wire the buttons and arrow keys.
    #[wasm_bindgen(constructor)]
    pub fn new(book_id: &str, prev_id: &str, next_id: &str, pages_json: &str) -> Result<ComicViewer, JsValue> {
        super::init_logging();
        let pages: Vec<ComicPage> = serde_json::from_str(pages_json).map_err(|e| JsValue::from_str(&e.to_string()))?;
        let book = Book::new(pages);

        let document = super::document()?;
        let container: Element = super::by_id(book_id)?;
        for (i, page) in book.pages().iter().enumerate() {
            let index = i + 1;
            let element: HtmlElement = create(&document, "div", "page")?;
            element.set_id(&element_id(index));
            element.style().set_property("z-index", &book.z_index(index).to_string())?;

            let content: Element = create(&document, "div", "page-content")?;
            let media: Element = create(&document, "div", "page-video")?;
            let video: HtmlVideoElement = create(&document, "video", "")?;
            video.set_muted(true);
            video.set_loop(true);
            video.set_src(&page.video);
            media.append_child(&video)?;

            let text: Element = create(&document, "div", "page-text")?;
            let paragraph = document.create_element("p")?;
            paragraph.set_text_content(Some(&page.text));
            text.append_child(&paragraph)?;

            content.append_child(&media)?;
            content.append_child(&text)?;
            element.append_child(&content)?;
            container.append_child(&element)?;
        }
        log::debug!("comic book built with {} pages", book.total());

        let view = Rc::new(View { book: RefCell::new(book), prev: super::by_id(prev_id)?, next: super::by_id(next_id)? });
        view.sync_buttons();

        let this = Rc::clone(&view);
        listen(&view.next, "click", move |_| this.turn(|book| book.next()))?;
        let this = Rc::clone(&view);
        listen(&view.prev, "click", move |_| this.turn(|book| book.prev()))?;
        let this = Rc::clone(&view);
        listen(&document, "keydown", move |event| {
            if let Some(key) = event.dyn_ref::<KeyboardEvent>() {
                let key = key.key();
                this.turn(|book| book.on_key(&key));
            }
        })?;

        play_video(&element_id(0));
        Ok(Self { view })
    }

    pub fn current(&self) -> usize {
        self.view.book.borrow().current()
    }

    pub fn next(&self) {
        self.view.turn(|book| book.next());
    }

    pub fn prev(&self) {
        self.view.turn(|book| book.prev());
    }
}

impl View {
    fn turn(&self, step: impl FnOnce(&mut Book) -> Option<Flip>) {
        let flip = step(&mut self.book.borrow_mut());
        let Some(flip) = flip else { return };

        match super::document().ok().and_then(|d| d.get_element_by_id(&flip.element)) {
            Some(element) => {
                let classes = element.class_list();
                let toggled = if flip.flipped { classes.add_1("flipped") } else { classes.remove_1("flipped") };
                if let Err(err) = toggled {
                    log::warn!("could not flip #{}: {}", flip.element, super::js_message(&err));
                }
            }
            None => log::warn!("missing page element #{}", flip.element),
        }
        play_video(&flip.play);
        self.sync_buttons();
    }

    fn sync_buttons(&self) {
        let book = self.book.borrow();
        self.prev.set_disabled(!book.can_prev());
        self.next.set_disabled(!book.can_next());
    }
}

fn play_video(page_id: &str) {
    let video = super::document()
        .ok()
        .and_then(|d| d.query_selector(&format!("#{page_id} video")).ok().flatten())
        .and_then(|v| v.dyn_into::<HtmlMediaElement>().ok());
    if let Some(video) = video {
        play_media(&video);
    }
}
