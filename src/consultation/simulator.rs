use rand::Rng;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::debug;

pub const SINGLE_SPECIALIST_REPLIES: [&str; 4] = [
    "Thank you for sharing that information. Based on what you've described, I'd like to ask a few more questions to better understand your condition.",
    "That's a very good question. Let me explain this from my clinical experience and current medical guidelines.",
    "I understand your concerns. In my practice, I often see similar cases, and here's what I typically recommend...",
    "Based on the symptoms you're describing, there are several possibilities we should consider. Let me walk you through the differential diagnosis.",
];

pub const PANEL_REPLIES: [&str; 4] = [
    "Thank you for sharing that. Each of us will look at this from our own specialty, so let's start with a few follow-up questions.",
    "That's a good question for the whole panel. We'll combine our clinical experience with current guidelines to answer it.",
    "We understand your concerns. Between our specialties we see cases like this often, and here's how we would usually approach it...",
    "From what you're describing, there are a few possibilities across our fields. Let us walk you through what each of us would consider.",
];

/// Which candidate list replies are drawn from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplyMode {
    Single,
    Panel,
}

impl ReplyMode {
    pub fn for_panel_size(count: usize) -> Self {
        if count > 1 {
            Self::Panel
        } else {
            Self::Single
        }
    }

    pub fn candidates(self) -> &'static [&'static str] {
        match self {
            Self::Single => &SINGLE_SPECIALIST_REPLIES,
            Self::Panel => &PANEL_REPLIES,
        }
    }
}

/// Produces canned specialist replies after a fixed delay
#[derive(Debug, Clone)]
pub struct ResponseSimulator {
    delay: Duration,
}

impl ResponseSimulator {
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Uniform pick from the candidate list of `mode`.
    pub fn pick_reply<R: Rng + ?Sized>(mode: ReplyMode, rng: &mut R) -> &'static str {
        let candidates = mode.candidates();
        candidates[rng.gen_range(0..candidates.len())]
    }

    /// Fire-and-forget: `deliver` runs once with the reply after the delay.
    /// Nothing cancels the task; the caller decides whether the reply still applies.
    pub fn schedule<F>(&self, mode: ReplyMode, deliver: F) -> JoinHandle<()>
    where
        F: FnOnce(String) + Send + 'static,
    {
        let delay = self.delay;
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let reply = Self::pick_reply(mode, &mut rand::thread_rng());
            debug!("Delivering simulated {:?} reply after {:?}", mode, delay);
            deliver(reply.to_string());
        })
    }
}

impl Default for ResponseSimulator {
    fn default() -> Self {
        Self::new(Duration::from_millis(1000))
    }
}
