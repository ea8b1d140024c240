use std::time::Duration;

#[derive(Debug, PartialEq, Clone, Copy)]
pub enum CardPhase {
    Hidden,   // Not on screen
    Entering, // Fading in and rising to the centre
    Shown,    // Resting at the centre
    Exiting,  // Fading out upwards
}

/// One slide message and its entrance/exit animation.
#[derive(Debug, Clone)]
pub struct SlideCard {
    pub text: String,

    pub visible: bool,
    pub phase: CardPhase,

    opacity: f32,
    offset: f32, // Vertical offset, fraction of the surface height
    scale: f32,

    start_opacity: f32,
    start_offset: f32,
    start_scale: f32,

    end_opacity: f32,
    end_offset: f32,
    end_scale: f32,

    animation_timer: Duration,
    transition: Duration,
    pub is_animating: bool,
}

fn lerp(from: f32, to: f32, t: f32) -> f32 {
    from + (to - from) * t
}

fn ease_out_cubic(t: f32) -> f32 {
    1.0 - (1.0 - t).powi(3)
}

impl SlideCard {
    pub fn new(text: impl Into<String>, transition: Duration) -> Self {
        Self {
            text: text.into(),
            visible: false,
            phase: CardPhase::Hidden,
            opacity: 0.0,
            offset: 0.08,
            scale: 0.9,
            start_opacity: 0.0,
            start_offset: 0.08,
            start_scale: 0.9,
            end_opacity: 0.0,
            end_offset: 0.08,
            end_scale: 0.9,
            animation_timer: Duration::ZERO,
            transition,
            is_animating: false,
        }
    }

    pub fn opacity(&self) -> f32 {
        self.opacity
    }

    pub fn offset(&self) -> f32 {
        self.offset
    }

    pub fn scale(&self) -> f32 {
        self.scale
    }

    pub fn start_entering(&mut self) {
        self.visible = true;
        self.phase = CardPhase::Entering;
        self.animate_to(1.0, 0.0, 1.0);
    }

    pub fn start_exiting(&mut self) {
        if self.phase == CardPhase::Hidden {
            return;
        }
        self.phase = CardPhase::Exiting;
        self.animate_to(0.0, -0.08, 1.05);
    }

    /// Jumps straight to the resting state, skipping the animation.
    pub fn show_now(&mut self) {
        self.visible = true;
        self.phase = CardPhase::Shown;
        self.is_animating = false;
        self.opacity = 1.0;
        self.offset = 0.0;
        self.scale = 1.0;
    }

    pub fn hide_now(&mut self) {
        *self = Self::new(std::mem::take(&mut self.text), self.transition);
    }

    fn animate_to(&mut self, opacity: f32, offset: f32, scale: f32) {
        self.start_opacity = self.opacity;
        self.start_offset = self.offset;
        self.start_scale = self.scale;
        self.end_opacity = opacity;
        self.end_offset = offset;
        self.end_scale = scale;
        self.animation_timer = Duration::ZERO;
        self.is_animating = true;
    }

    pub fn update(&mut self, dt: Duration) {
        if !self.is_animating {
            return;
        }
        self.animation_timer += dt;
        let t = if self.transition.is_zero() {
            1.0
        } else {
            (self.animation_timer.as_secs_f32() / self.transition.as_secs_f32()).min(1.0)
        };
        let t = ease_out_cubic(t);

        self.opacity = lerp(self.start_opacity, self.end_opacity, t);
        self.offset = lerp(self.start_offset, self.end_offset, t);
        self.scale = lerp(self.start_scale, self.end_scale, t);

        if self.animation_timer >= self.transition {
            self.is_animating = false;
            self.opacity = self.end_opacity;
            self.offset = self.end_offset;
            self.scale = self.end_scale;
            match self.phase {
                CardPhase::Entering => self.phase = CardPhase::Shown,
                CardPhase::Exiting => self.hide_now(),
                CardPhase::Hidden | CardPhase::Shown => {}
            }
        }
    }
}
