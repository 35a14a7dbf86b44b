pub mod navigation;

/// The [`StateMachine`] trait provides calling semantics and indicates the upholding of invariants
/// that guarantee deterministic behavior.
///
/// # Functionality
/// State machines operate on defined inputs and outputs. The groupings are provided by the
/// associated types [`Input`](StateMachine::Input) and [`Output`](StateMachine::Output), most
/// often enums. Method dispatch is defined by [`process_input`](StateMachine::process_input) and
/// [`poll_output`](StateMachine::poll_output).
///
/// One input may produce several outputs. Callers drain [`poll_output`](StateMachine::poll_output)
/// until it returns `None` before processing the next input, which is what makes a single input
/// an atomic step: nothing observes a half-applied transition.
///
/// # Invariants
/// A [`StateMachine`] must be pure in that its operation does not depend on any external behavior
/// of the broader system, so that the same inputs always produce the same outputs.
///
/// ## No Interior Mutability
/// All state is either immutable or mutated only through `&mut self`. No [`std::cell`] containers
/// and no [`std::sync`] locks.
///
/// Immutable data may be shared through [`Arc`](std::sync::Arc) as long as the machine never
/// inspects reference counts or upgrades weak pointers.
///
/// ## No IO
/// No [`std::io`], [`std::net`], or libraries that reach the operating system. Work that needs the
/// outside world (subscribing to a sensor, sending a request) is requested through an output and
/// carried out by whoever drives the machine. Its result, if any, comes back as an input.
///
/// ### No System Time, No System RNG
/// Clocks and entropy are external state. Timestamps and identifiers the machine needs must be
/// provided via input.
///
/// ## No Concurrency, No Async, No Blocking
/// The driver decides when inputs are processed. The machine never spawns, awaits, or blocks.
///
/// # Side Effects
/// Logging through `tracing` is allowed. The logic of the state machine *must not* depend on the
/// outcome of such side effects.
///
/// # Runners
/// A runner wraps the pure state machine, owns the IO, and translates between the two: it turns
/// external events into inputs and carries out the requests the machine emits as outputs. See
/// [`Navigator`](crate::navigator::Navigator) for the runner of
/// [`NavigationMachine`](navigation::NavigationMachine).
pub trait StateMachine {
    /// The type of input that is [processed](StateMachine::process_input) by the state machine.
    type Input;
    /// The type of output that is [polled](StateMachine::poll_output) from the state machine.
    type Output;

    /// Process the provided `input` into the state machine.
    fn process_input(&mut self, input: Self::Input);

    /// Poll the state machine for output, returning the first available output if present.
    fn poll_output(&mut self) -> Option<Self::Output>;
}
