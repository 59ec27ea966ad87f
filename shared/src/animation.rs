use crate::colors::{Rgb, interpolate_hsl};
use crate::style::FeatureStyle;

/// A fill/opacity cross-fade for one feature.
#[derive(Debug, Clone)]
pub struct StyleTransition {
    pub from_hsl: (f64, f64, f64),
    pub to_hsl: (f64, f64, f64),
    pub from_opacity: f64,
    pub to_opacity: f64,
    pub start_time: f64,
    pub duration: f64, // milliseconds
}

impl StyleTransition {
    pub fn new(from: (Rgb, f64), to: (Rgb, f64), start_time: f64, duration: f64) -> Self {
        Self {
            from_hsl: from.0.to_hsl(),
            to_hsl: to.0.to_hsl(),
            from_opacity: from.1,
            to_opacity: to.1,
            start_time,
            duration,
        }
    }

    /// Returns the current (fill, opacity), or None if the fade is complete.
    pub fn current(&self, now: f64) -> Option<(Rgb, f64)> {
        let elapsed = (now - self.start_time).max(0.0);
        if elapsed >= self.duration {
            return None;
        }

        let t = cubic_ease_out(elapsed / self.duration);
        let fill = Rgb::from_hsl(interpolate_hsl(self.from_hsl, self.to_hsl, t));
        let opacity = self.from_opacity + (self.to_opacity - self.from_opacity) * t;
        Some((fill, opacity))
    }
}

/// Cubic ease-out: decelerating to zero velocity.
pub fn cubic_ease_out(t: f64) -> f64 {
    let t = t.clamp(0.0, 1.0) - 1.0;
    t * t * t + 1.0
}

#[derive(Debug, Clone)]
struct Slot {
    target: FeatureStyle,
    transition: Option<StyleTransition>,
}

impl Slot {
    fn displayed(&self, now: f64) -> FeatureStyle {
        match self.transition.as_ref().and_then(|tr| tr.current(now)) {
            Some((fill, opacity)) => FeatureStyle {
                fill,
                opacity,
                ..self.target
            },
            None => self.target,
        }
    }
}

/// Per-feature presentation state sitting between the pure styler and the
/// renderer. Fill and opacity fade toward each new target; stroke, glow and
/// interactivity follow the target immediately.
#[derive(Debug, Clone)]
pub struct StyleAnimator {
    duration: f64,
    slots: Vec<Option<Slot>>,
}

impl StyleAnimator {
    pub fn new(duration_ms: f64) -> Self {
        Self {
            duration: duration_ms.max(0.0),
            slots: Vec::new(),
        }
    }

    /// The style to draw feature `index` with at `now` (milliseconds),
    /// given the styler's current `target`. The first style seen for a
    /// feature is shown without fading.
    pub fn resolve(&mut self, index: usize, target: FeatureStyle, now: f64) -> FeatureStyle {
        if index >= self.slots.len() {
            self.slots.resize(index + 1, None);
        }
        let duration = self.duration;
        let slot = self.slots[index].get_or_insert_with(|| Slot {
            target,
            transition: None,
        });

        if slot.target.fill != target.fill || slot.target.opacity != target.opacity {
            let shown = slot.displayed(now);
            slot.transition = (duration > 0.0).then(|| {
                StyleTransition::new(
                    (shown.fill, shown.opacity),
                    (target.fill, target.opacity),
                    now,
                    duration,
                )
            });
        }
        slot.target = target;

        let shown = slot.displayed(now);
        if slot
            .transition
            .as_ref()
            .is_some_and(|tr| tr.current(now).is_none())
        {
            slot.transition = None;
        }
        shown
    }

    pub fn is_animating(&self, now: f64) -> bool {
        self.slots.iter().flatten().any(|slot| {
            slot.transition
                .as_ref()
                .is_some_and(|tr| tr.current(now).is_some())
        })
    }
}
