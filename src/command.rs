use alloc::boxed::Box;
use alloc::collections::BTreeSet;
use core::fmt;

/// Opaque identifier of a subsystem, i.e. a resource such as an arm or an elevator that at most
/// one command may drive at a time.
///
/// The scheduler owning the commands uses these identifiers for mutual exclusion; commands only
/// declare them.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SubsystemId(&'static str);

impl SubsystemId {
    /// Creates an identifier; ids compare equal when their names do.
    pub const fn new(name: &'static str) -> Self {
        SubsystemId(name)
    }

    /// Returns the name the id was created with.
    pub fn name(&self) -> &'static str {
        self.0
    }
}

impl fmt::Display for SubsystemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0)
    }
}

/// A unit of work driven by a periodic, single-threaded scheduler.
///
/// The scheduler calls `initialize` once when the command is scheduled, `execute` once per tick
/// while it stays scheduled, and `end` once when it leaves the scheduler, either because
/// `is_finished` returned true (`interrupted == false`) or because it was cancelled or preempted
/// (`interrupted == true`). None of these hooks may block.
pub trait Command {
    /// Called once when the command is scheduled.
    fn initialize(&mut self) {}

    /// Called on every scheduler tick while the command is scheduled.
    fn execute(&mut self) {}

    /// Called once when the command stops running.
    fn end(&mut self, interrupted: bool) {
        let _ = interrupted;
    }

    /// Polled by the scheduler after each `execute`. Defaults to running forever.
    fn is_finished(&mut self) -> bool {
        false
    }

    /// The subsystems this command needs exclusive use of.
    fn requirements(&self) -> &BTreeSet<SubsystemId>;

    /// Decorates this command so that it also finishes once `condition` returns true.
    ///
    /// All other hooks are forwarded unchanged.
    fn until<P>(self, condition: P) -> Until<Self, P>
    where
        Self: Sized,
        P: FnMut() -> bool,
    {
        Until {
            command: self,
            condition,
        }
    }
}

impl<C: Command + ?Sized> Command for Box<C> {
    fn initialize(&mut self) {
        (**self).initialize();
    }

    fn execute(&mut self) {
        (**self).execute();
    }

    fn end(&mut self, interrupted: bool) {
        (**self).end(interrupted);
    }

    fn is_finished(&mut self) -> bool {
        (**self).is_finished()
    }

    fn requirements(&self) -> &BTreeSet<SubsystemId> {
        (**self).requirements()
    }
}

/// A command that finishes when its inner command does or when a condition becomes true.
///
/// Created by [`Command::until`].
pub struct Until<C, P> {
    command: C,
    condition: P,
}

impl<C, P> Until<C, P> {
    /// Returns the decorated command.
    pub fn inner(&self) -> &C {
        &self.command
    }

    /// Returns the decorated command mutably.
    pub fn inner_mut(&mut self) -> &mut C {
        &mut self.command
    }

    /// Drops the condition and returns the decorated command.
    pub fn into_inner(self) -> C {
        self.command
    }
}

impl<C: Command, P: FnMut() -> bool> Command for Until<C, P> {
    fn initialize(&mut self) {
        self.command.initialize();
    }

    fn execute(&mut self) {
        self.command.execute();
    }

    fn end(&mut self, interrupted: bool) {
        self.command.end(interrupted);
    }

    fn is_finished(&mut self) -> bool {
        self.command.is_finished() || (self.condition)()
    }

    fn requirements(&self) -> &BTreeSet<SubsystemId> {
        self.command.requirements()
    }
}

impl<C: fmt::Debug, P> fmt::Debug for Until<C, P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Until")
            .field("command", &self.command)
            .finish_non_exhaustive()
    }
}
