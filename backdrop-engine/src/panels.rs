// panels.rs - Scroll-triggered panel state
//
// A panel is active while the viewport's horizontal centre line lies within
// it. Crossing events mirror the four scroll directions so the view can play
// and pause panel media.

/// Entrance fires once the panel top is this far above the viewport bottom
const ENTRANCE_OFFSET: f32 = 100.0;
const ENTRANCE_RISE: f32 = 100.0;
const PARALLAX_PERCENT: f32 = 20.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Zone {
    Below,
    Active,
    Above,
}

fn zone(top: f32, bottom: f32, viewport_h: f32) -> Zone {
    let center = viewport_h * 0.5;
    if top > center {
        Zone::Below
    } else if bottom > center {
        Zone::Active
    } else {
        Zone::Above
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Crossing {
    Enter,
    Leave,
    EnterBack,
    LeaveBack,
}

impl Crossing {
    pub fn activates(self) -> bool {
        matches!(self, Crossing::Enter | Crossing::EnterBack)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PanelEvent {
    pub index: usize,
    pub crossing: Crossing,
}

/// Viewport-relative vertical extent of a panel, in css px
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PanelRect {
    pub top: f32,
    pub bottom: f32,
}

#[derive(Debug, Default)]
pub struct PanelTracker {
    zones: Vec<Zone>,
}

impl PanelTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_active(&self, index: usize) -> bool {
        self.zones.get(index) == Some(&Zone::Active)
    }

    /// Compare against the last update and report every crossing. A jump
    /// straight across a panel reports both of its crossings.
    pub fn update(&mut self, rects: &[PanelRect], viewport_h: f32) -> Vec<PanelEvent> {
        let mut events = Vec::new();
        self.zones.resize(rects.len(), Zone::Below);

        for (index, rect) in rects.iter().enumerate() {
            let now = zone(rect.top, rect.bottom, viewport_h);
            let was = self.zones[index];
            let mut push = |crossing| events.push(PanelEvent { index, crossing });
            match (was, now) {
                (Zone::Below, Zone::Active) => push(Crossing::Enter),
                (Zone::Active, Zone::Above) => push(Crossing::Leave),
                (Zone::Above, Zone::Active) => push(Crossing::EnterBack),
                (Zone::Active, Zone::Below) => push(Crossing::LeaveBack),
                (Zone::Below, Zone::Above) => {
                    push(Crossing::Enter);
                    push(Crossing::Leave);
                }
                (Zone::Above, Zone::Below) => {
                    push(Crossing::EnterBack);
                    push(Crossing::LeaveBack);
                }
                _ => {}
            }
            self.zones[index] = now;
        }
        events
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Entrance {
    pub opacity: f32,
    pub offset_y: f32,
}

/// Target entrance state; the view animates towards it over a second.
pub fn entrance(top: f32, viewport_h: f32) -> Entrance {
    if top <= viewport_h - ENTRANCE_OFFSET {
        Entrance { opacity: 1.0, offset_y: 0.0 }
    } else {
        Entrance { opacity: 0.0, offset_y: ENTRANCE_RISE }
    }
}

/// Media offset in percent of its height, 20 as the panel enters from below
/// down to 0 as it leaves over the top.
pub fn parallax(rect: PanelRect, viewport_h: f32) -> f32 {
    let travel = viewport_h + (rect.bottom - rect.top);
    if travel <= 0.0 {
        return 0.0;
    }
    let progress = ((viewport_h - rect.top) / travel).clamp(0.0, 1.0);
    PARALLAX_PERCENT * (1.0 - progress)
}
