// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Defines the swapchain acquire/present state machine.
//!
//! Backends own the driver objects; this module only decides what to do
//! with them. Each transition returns an action the backend carries out.

use crate::graphics::error::{GraphicsError, GraphicsResult};
use std::fmt;

/// Where a swapchain stands in its acquire/present cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SwapChainState {
    /// Created but not yet configured.
    Unconfigured,
    /// Configured, no image acquired.
    Idle,
    /// An image is acquired and not yet presented.
    Acquired,
    /// The surface is being reconfigured.
    Reconfiguring,
    /// Destroyed. Nothing works anymore.
    Gone,
}

impl fmt::Display for SwapChainState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SwapChainState::Unconfigured => "Unconfigured",
            SwapChainState::Idle => "Idle",
            SwapChainState::Acquired => "Acquired",
            SwapChainState::Reconfiguring => "Reconfiguring",
            SwapChainState::Gone => "Gone",
        };
        f.write_str(name)
    }
}

/// What the driver said when asked for the next image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AcquireStatus {
    /// An image is ready.
    Optimal,
    /// An image is ready but the surface no longer matches it exactly.
    Suboptimal,
    /// Nothing was ready in time.
    Timeout,
    /// The surface changed and must be reconfigured.
    Outdated,
    /// The surface is gone.
    Lost,
    /// The driver ran out of memory.
    OutOfMemory,
    /// Any other failure.
    Other,
}

/// What the backend should do after an acquire attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AcquireAction {
    /// Hand the image out.
    Use,
    /// Reconfigure the surface, report it with
    /// [`SwapChainStateMachine::configured`], and try once more.
    ReconfigureAndRetry,
    /// Drop whatever was acquired and return nothing.
    GiveUp,
}

/// What the backend should do on present.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PresentAction {
    /// Present the image.
    Present,
    /// Present the image, then reconfigure the surface.
    PresentAndReconfigure,
    /// Nothing to present.
    Skip,
}

/// What the backend should do on resize.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResizeAction {
    /// Drop the acquired view (if `drop_view`) and reconfigure at the new size.
    Reconfigure {
        /// Whether an image was outstanding.
        drop_view: bool,
    },
    /// The size did not change.
    Unchanged,
    /// The request was ignored.
    Ignore,
}

/// The acquire/present state machine of one swapchain.
#[derive(Debug, Clone)]
pub struct SwapChainStateMachine {
    state: SwapChainState,
    width: u32,
    height: u32,
    needs_reconfigure: bool,
    retried: bool,
}

impl SwapChainStateMachine {
    /// A state machine for a swapchain that will be configured at
    /// `width` x `height`.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            state: SwapChainState::Unconfigured,
            width,
            height,
            needs_reconfigure: false,
            retried: false,
        }
    }

    /// The current state.
    pub fn state(&self) -> SwapChainState {
        self.state
    }

    /// The configured size.
    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Whether a reconfigure is pending, either because the last acquire was
    /// suboptimal or because the last reconfigure failed.
    pub fn needs_reconfigure(&self) -> bool {
        self.needs_reconfigure
    }

    /// Records that the surface has been (re)configured.
    pub fn configured(&mut self) -> GraphicsResult<()> {
        if self.state == SwapChainState::Gone {
            return Err(GraphicsError::state("swapchain has been destroyed"));
        }
        self.state = SwapChainState::Idle;
        self.needs_reconfigure = false;
        Ok(())
    }

    /// Records that a reconfigure failed. The swapchain falls back to `Idle`
    /// with the reconfigure still pending, so the next acquire can retry it.
    pub fn reconfigure_failed(&mut self) {
        if matches!(
            self.state,
            SwapChainState::Reconfiguring | SwapChainState::Idle
        ) {
            self.state = SwapChainState::Idle;
            self.needs_reconfigure = true;
        }
    }

    /// Starts an acquire. Returns `true` if an image was still outstanding
    /// and must be dropped first.
    pub fn begin_acquire(&mut self) -> GraphicsResult<bool> {
        self.retried = false;
        match self.state {
            SwapChainState::Idle => Ok(false),
            SwapChainState::Acquired => {
                log::warn!(
                    "SwapChain: acquiring a new image before presenting the previous one, dropping it"
                );
                self.state = SwapChainState::Idle;
                Ok(true)
            }
            SwapChainState::Unconfigured | SwapChainState::Reconfiguring => Err(
                GraphicsError::state(format!("cannot acquire while {}", self.state)),
            ),
            SwapChainState::Gone => Err(GraphicsError::state("swapchain has been destroyed")),
        }
    }

    /// Classifies the driver's answer to an acquire.
    pub fn on_acquire(&mut self, status: AcquireStatus) -> AcquireAction {
        match status {
            AcquireStatus::Optimal => {
                self.state = SwapChainState::Acquired;
                AcquireAction::Use
            }
            AcquireStatus::Suboptimal => {
                log::debug!("SwapChain: acquired a suboptimal image, will reconfigure on present");
                self.state = SwapChainState::Acquired;
                self.needs_reconfigure = true;
                AcquireAction::Use
            }
            AcquireStatus::Outdated if !self.retried => {
                log::debug!("SwapChain: surface outdated, reconfiguring and retrying once");
                self.retried = true;
                self.state = SwapChainState::Reconfiguring;
                AcquireAction::ReconfigureAndRetry
            }
            AcquireStatus::Outdated => {
                log::error!("SwapChain: surface still outdated after reconfiguring");
                self.state = SwapChainState::Idle;
                AcquireAction::GiveUp
            }
            AcquireStatus::Timeout => {
                log::warn!("SwapChain: timed out waiting for the next image");
                self.state = SwapChainState::Idle;
                AcquireAction::GiveUp
            }
            AcquireStatus::Lost | AcquireStatus::OutOfMemory | AcquireStatus::Other => {
                log::error!("SwapChain: failed to acquire the next image: {status:?}");
                self.state = SwapChainState::Idle;
                AcquireAction::GiveUp
            }
        }
    }

    /// Classifies a present request.
    pub fn present(&mut self) -> PresentAction {
        match self.state {
            SwapChainState::Acquired if self.needs_reconfigure => {
                self.state = SwapChainState::Reconfiguring;
                PresentAction::PresentAndReconfigure
            }
            SwapChainState::Acquired => {
                self.state = SwapChainState::Idle;
                PresentAction::Present
            }
            _ => {
                log::warn!("SwapChain: present() called without an acquired image");
                PresentAction::Skip
            }
        }
    }

    /// Classifies a resize request. On `Reconfigure` the new size is
    /// recorded immediately.
    pub fn resize(&mut self, width: u32, height: u32) -> ResizeAction {
        if self.state == SwapChainState::Gone {
            log::warn!("SwapChain: resize() on a destroyed swapchain");
            return ResizeAction::Ignore;
        }
        if width == 0 || height == 0 {
            log::warn!("SwapChain: ignoring resize to {width}x{height}");
            return ResizeAction::Ignore;
        }
        if (width, height) == (self.width, self.height) && !self.needs_reconfigure {
            return ResizeAction::Unchanged;
        }
        log::info!(
            "SwapChain: resizing from {}x{} to {width}x{height}",
            self.width,
            self.height
        );
        let drop_view = self.state == SwapChainState::Acquired;
        self.width = width;
        self.height = height;
        self.state = SwapChainState::Reconfiguring;
        ResizeAction::Reconfigure { drop_view }
    }

    /// Marks the swapchain destroyed. Returns `true` if an image was still
    /// outstanding.
    pub fn destroy(&mut self) -> bool {
        let outstanding = self.state == SwapChainState::Acquired;
        self.state = SwapChainState::Gone;
        outstanding
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn configured(width: u32, height: u32) -> SwapChainStateMachine {
        let mut machine = SwapChainStateMachine::new(width, height);
        machine.configured().unwrap();
        machine
    }

    #[test]
    fn acquire_present_cycle() {
        let mut machine = configured(800, 600);
        assert_eq!(machine.state(), SwapChainState::Idle);
        assert!(!machine.begin_acquire().unwrap());
        assert_eq!(machine.on_acquire(AcquireStatus::Optimal), AcquireAction::Use);
        assert_eq!(machine.state(), SwapChainState::Acquired);
        assert_eq!(machine.present(), PresentAction::Present);
        assert_eq!(machine.state(), SwapChainState::Idle);
    }

    #[test]
    fn acquire_before_configure_is_a_state_violation() {
        let mut machine = SwapChainStateMachine::new(800, 600);
        let err = machine.begin_acquire().unwrap_err();
        assert!(matches!(err, GraphicsError::StateViolation(_)));
    }

    #[test]
    fn second_acquire_drops_the_outstanding_image() {
        let mut machine = configured(800, 600);
        machine.begin_acquire().unwrap();
        machine.on_acquire(AcquireStatus::Optimal);
        assert!(machine.begin_acquire().unwrap());
    }

    #[test]
    fn outdated_retries_exactly_once() {
        let mut machine = configured(800, 600);
        machine.begin_acquire().unwrap();
        assert_eq!(
            machine.on_acquire(AcquireStatus::Outdated),
            AcquireAction::ReconfigureAndRetry
        );
        assert_eq!(machine.state(), SwapChainState::Reconfiguring);
        machine.configured().unwrap();
        assert_eq!(machine.on_acquire(AcquireStatus::Outdated), AcquireAction::GiveUp);
        assert_eq!(machine.state(), SwapChainState::Idle);

        // A fresh acquire gets a fresh retry.
        machine.begin_acquire().unwrap();
        assert_eq!(
            machine.on_acquire(AcquireStatus::Outdated),
            AcquireAction::ReconfigureAndRetry
        );
    }

    #[test]
    fn failed_reconfigure_returns_to_idle_and_stays_pending() {
        let mut machine = configured(800, 600);
        machine.begin_acquire().unwrap();
        machine.on_acquire(AcquireStatus::Outdated);
        machine.reconfigure_failed();
        assert_eq!(machine.state(), SwapChainState::Idle);
        assert!(machine.needs_reconfigure());

        // The next frame may acquire again and retry the configure.
        assert!(!machine.begin_acquire().unwrap());
        machine.configured().unwrap();
        assert!(!machine.needs_reconfigure());
        assert_eq!(machine.on_acquire(AcquireStatus::Optimal), AcquireAction::Use);

        // A failed reconfigure after a suboptimal present behaves the same.
        machine.needs_reconfigure = true;
        assert_eq!(machine.present(), PresentAction::PresentAndReconfigure);
        machine.reconfigure_failed();
        assert_eq!(machine.state(), SwapChainState::Idle);
        assert!(machine.begin_acquire().is_ok());

        // Resizes force a reconfigure even at the same size while one is pending.
        machine.reconfigure_failed();
        assert_eq!(
            machine.resize(800, 600),
            ResizeAction::Reconfigure { drop_view: false }
        );

        machine.destroy();
        machine.reconfigure_failed();
        assert_eq!(machine.state(), SwapChainState::Gone);
    }

    #[test]
    fn failures_give_up() {
        for status in [
            AcquireStatus::Lost,
            AcquireStatus::OutOfMemory,
            AcquireStatus::Timeout,
            AcquireStatus::Other,
        ] {
            let mut machine = configured(800, 600);
            machine.begin_acquire().unwrap();
            assert_eq!(machine.on_acquire(status), AcquireAction::GiveUp);
            assert_eq!(machine.state(), SwapChainState::Idle);
        }
    }

    #[test]
    fn suboptimal_is_used_and_reconfigured_on_present() {
        let mut machine = configured(800, 600);
        machine.begin_acquire().unwrap();
        assert_eq!(machine.on_acquire(AcquireStatus::Suboptimal), AcquireAction::Use);
        assert_eq!(machine.present(), PresentAction::PresentAndReconfigure);
        machine.configured().unwrap();
        assert!(!machine.needs_reconfigure());
    }

    #[test]
    fn present_without_acquire_is_skipped() {
        let mut machine = configured(800, 600);
        assert_eq!(machine.present(), PresentAction::Skip);
        assert_eq!(machine.state(), SwapChainState::Idle);
    }

    #[test]
    fn resize_rules() {
        let mut machine = configured(800, 600);
        assert_eq!(machine.resize(0, 600), ResizeAction::Ignore);
        assert_eq!(machine.resize(800, 600), ResizeAction::Unchanged);
        assert_eq!(
            machine.resize(1024, 768),
            ResizeAction::Reconfigure { drop_view: false }
        );
        assert_eq!(machine.size(), (1024, 768));
        machine.configured().unwrap();
        // Resizing twice to the same size is idempotent.
        assert_eq!(machine.resize(1024, 768), ResizeAction::Unchanged);

        machine.begin_acquire().unwrap();
        machine.on_acquire(AcquireStatus::Optimal);
        assert_eq!(
            machine.resize(640, 480),
            ResizeAction::Reconfigure { drop_view: true }
        );
        assert_eq!(machine.state(), SwapChainState::Reconfiguring);
    }

    #[test]
    fn destroy_is_terminal() {
        let mut machine = configured(800, 600);
        assert!(!machine.destroy());
        assert_eq!(machine.state(), SwapChainState::Gone);
        assert!(machine.configured().is_err());
        assert!(machine.begin_acquire().is_err());
        assert_eq!(machine.resize(10, 10), ResizeAction::Ignore);
        assert_eq!(machine.present(), PresentAction::Skip);
    }
}
