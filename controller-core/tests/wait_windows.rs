//! Button activity that lands inside a blocking wait.

use std::cell::RefCell;
use std::rc::Rc;

use controller_core::driver::Controller;
use controller_core::io::{ControllerIo, LedCommand, SimulatedLines};
use controller_core::lines::LineId;
use controller_core::sequencer::{PowerState, SETTLE_TICKS};
use controller_core::timebase::{Clock, LogicalClock, Ticks};

type Board = Rc<RefCell<SimulatedLines>>;

/// Port that reads and drives a bank shared with [`TappingClock`].
struct SharedLines(Board);

impl ControllerIo for SharedLines {
    fn button_pressed(&mut self) -> bool {
        self.0.borrow_mut().button_pressed()
    }

    fn host_alive(&mut self) -> bool {
        self.0.borrow_mut().host_alive()
    }

    fn set_power(&mut self, on: bool) {
        self.0.borrow_mut().set_power(on);
    }

    fn set_led(&mut self, command: LedCommand) {
        self.0.borrow_mut().set_led(command);
    }

    fn set_shutdown_request(&mut self, requested: bool) {
        self.0.borrow_mut().set_shutdown_request(requested);
    }
}

/// Clock that changes the button at fixed offsets into every wait.
struct TappingClock {
    inner: LogicalClock,
    board: Board,
    /// `(tick offset, pressed)` pairs applied before that tick is delivered.
    schedule: Vec<(u16, bool)>,
    taps: u32,
}

impl TappingClock {
    fn new(board: Board) -> Self {
        Self {
            inner: LogicalClock::new(),
            board,
            schedule: Vec::new(),
            taps: 0,
        }
    }

    /// Release at the start of the wait, then press at `at` and release one tick later.
    fn tap_at(&mut self, at: u16) {
        self.schedule = vec![(0, false), (at, true), (at + 1, false)];
    }
}

impl Clock for TappingClock {
    fn wait(&mut self, periods: u16) {
        self.inner.time_base().start_wait(periods);
        let mut offset = 0u16;
        while !self.inner.time_base().is_idle() {
            for (at, pressed) in &self.schedule {
                if *at == offset {
                    let mut board = self.board.borrow_mut();
                    if *pressed {
                        board.press_button();
                        self.taps += 1;
                    } else {
                        board.release_button();
                    }
                }
            }
            self.inner.advance(1);
            offset += 1;
        }
    }

    fn now(&self) -> Ticks {
        self.inner.now()
    }
}

fn controller() -> (Controller<SharedLines, TappingClock>, Board) {
    let board = Rc::new(RefCell::new(SimulatedLines::new()));
    let controller = Controller::new(
        SharedLines(Rc::clone(&board)),
        TappingClock::new(Rc::clone(&board)),
    );
    (controller, board)
}

#[test]
fn press_during_settle_is_never_sampled() {
    let (mut controller, board) = controller();
    controller.clock_mut().tap_at(3);
    {
        let mut lines = board.borrow_mut();
        lines.set_host_alive(true);
        lines.press_button();
    }

    controller.step();
    assert_eq!(controller.sequencer().state(), PowerState::PoweredOn);
    // Only the settle wait is long enough to reach the tap.
    assert_eq!(controller.clock().taps, 1);
    assert!(!board.borrow().asserted(LineId::Button));

    for _ in 0..10 {
        controller.step();
    }
    assert_eq!(controller.sequencer().state(), PowerState::PoweredOn);
    assert!(!board.borrow().asserted(LineId::ShutdownRequest));
    assert!(controller.now() > Ticks::new(u32::from(SETTLE_TICKS)));
}

#[test]
fn press_during_shutdown_recheck_is_never_sampled() {
    let (mut controller, board) = controller();
    {
        let mut lines = board.borrow_mut();
        lines.set_host_alive(true);
        lines.press_button();
    }
    controller.step();
    controller.step();
    assert_eq!(controller.sequencer().state(), PowerState::ShuttingDown);

    board.borrow_mut().release_button();
    controller.clock_mut().tap_at(3);
    for _ in 0..20 {
        controller.step();
    }

    assert_eq!(controller.clock().taps, 20);
    assert_eq!(controller.sequencer().state(), PowerState::ShuttingDown);
    assert!(board.borrow().asserted(LineId::PowerSwitch));
    assert!(board.borrow().asserted(LineId::ShutdownRequest));

    board.borrow_mut().set_host_alive(false);
    controller.step();
    assert_eq!(controller.sequencer().state(), PowerState::Standby);
}
