use std::time::Duration;

pub const RENDER_WIDTH: i32 = 1280;           // Width of the presentation surface
pub const RENDER_HEIGHT: i32 = 720;           // Height of the presentation surface
pub const FPS: u32 = 60;                      // Frames per second
pub const FRAME_TIME: Duration = Duration::from_micros(1_000_000 / FPS as u64); // Time per frame
pub const EXIT_LINGER: Duration = Duration::from_millis(1500);      // Headless run stays up this long once done

// Slides
pub const SLIDE_TRANSITION: Duration = Duration::from_millis(800);   // Enter/exit animation of a slide
pub const SLIDE_DELAY: Duration = Duration::from_millis(2500);       // Hold between a settled slide and the next one
pub const COMPLETION_DELAY: Duration = Duration::from_millis(400);   // Trailing pause after the last item
pub const HIDE_DELAY: Duration = Duration::from_millis(1000);        // Slide container lingers this long once complete

// Letter
pub const ENTRANCE_DELAY: Duration = Duration::from_millis(500);     // Wait after the slides finish
pub const ENTRANCE_DURATION: Duration = Duration::from_millis(1000); // Letter fade-in
pub const WORD_DELAY: Duration = Duration::from_millis(80);          // Typewriter pause per word
pub const SENTENCE_PAUSE_FACTOR: u32 = 3;                            // Word delay multiplier after . ! ?
pub const PARAGRAPH_DELAY: Duration = Duration::from_millis(400);    // Pause between paragraphs
pub const SIGNATURE_DELAY: Duration = Duration::from_millis(600);    // Pause before the closing line
pub const SIGNATURE_STEP: Duration = Duration::from_millis(500);     // Closing -> name -> mark

// Particles
pub const PARTICLE_LIFETIME: Duration = Duration::from_millis(3000);
pub const AMBIENT_INTERVAL: Duration = Duration::from_millis(1500);
pub const MAX_PARTICLES: usize = 48;
pub const PARTICLE_RISE_SPEED: f32 = 60.0;                           // Pixels per second

pub const REDUCED_MOTION_DIVISOR: u32 = 5;                           // Timing divisor when motion is reduced
