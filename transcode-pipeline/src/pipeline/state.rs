use state_machines::state_machine;

state_machine! {
    name: TranscodeMachine,
    state: TranscodeState,
    initial: Created,
    states: [Created, Probed, Converted, Split, Completed, Failed],
    events {
        probe { transition: { from: Created, to: Probed } }
        convert { transition: { from: Probed, to: Converted } }
        split { transition: { from: Converted, to: Split } }
        complete { transition: { from: Split, to: Completed } }
        abort {
            transition: { from: Created, to: Failed }
            transition: { from: Probed, to: Failed }
            transition: { from: Converted, to: Failed }
            transition: { from: Split, to: Failed }
        }
    }
}

pub fn created() -> TranscodeMachine<(), Created> {
    TranscodeMachine::new(())
}
