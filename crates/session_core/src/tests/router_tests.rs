use super::*;
use shared::domain::WorkoutId;

fn router_with_queue(depth: usize) -> (CommandRouter, mpsc::Receiver<ControlMessage>) {
    let (tx, rx) = mpsc::channel(depth);
    (CommandRouter::new(tx), rx)
}

fn expect_command(message: ControlMessage) -> SessionCommand {
    match message {
        ControlMessage::Command(command) => command,
        _ => panic!("expected a queued command"),
    }
}

#[tokio::test]
async fn commands_arrive_in_dispatch_order() {
    let (router, mut rx) = router_with_queue(8);

    router.dispatch(SessionCommand::Start {
        workout_id: WorkoutId(1),
    })
    .expect("dispatch");
    router.dispatch(SessionCommand::Pause).expect("dispatch");
    router.dispatch(SessionCommand::Cancel).expect("dispatch");

    assert!(matches!(
        expect_command(rx.recv().await.expect("msg")),
        SessionCommand::Start { workout_id } if workout_id == WorkoutId(1)
    ));
    assert_eq!(expect_command(rx.recv().await.expect("msg")), SessionCommand::Pause);
    assert_eq!(expect_command(rx.recv().await.expect("msg")), SessionCommand::Cancel);
}

#[tokio::test]
async fn concurrent_producers_each_deliver_exactly_once() {
    let (router, mut rx) = router_with_queue(64);

    let mut tasks = Vec::new();
    for id in 0..16 {
        let router = router.clone();
        tasks.push(tokio::spawn(async move {
            router
                .dispatch(SessionCommand::Start {
                    workout_id: WorkoutId(id),
                })
                .expect("dispatch");
        }));
    }
    for task in tasks {
        task.await.expect("producer task");
    }

    let mut seen = Vec::new();
    for _ in 0..16 {
        if let SessionCommand::Start { workout_id } = expect_command(rx.recv().await.expect("msg")) {
            seen.push(workout_id.0);
        }
    }
    seen.sort_unstable();
    assert_eq!(seen, (0..16).collect::<Vec<i64>>());
}

#[tokio::test]
async fn full_queue_is_reported() {
    let (router, _rx) = router_with_queue(1);

    router.dispatch(SessionCommand::Pause).expect("first fits");
    assert_eq!(
        router.dispatch(SessionCommand::Pause),
        Err(DispatchError::QueueFull)
    );
}

#[tokio::test]
async fn closed_queue_is_reported() {
    let (router, rx) = router_with_queue(1);
    drop(rx);

    assert_eq!(
        router.dispatch(SessionCommand::Pause),
        Err(DispatchError::Closed)
    );
}

#[tokio::test]
async fn unknown_actions_are_dropped_without_effect() {
    let (router, mut rx) = router_with_queue(4);

    router.dispatch_action("explode");
    router.dispatch_action("start:not-a-number");
    router.dispatch_action("");

    assert!(rx.try_recv().is_err(), "nothing may reach the queue");

    router.dispatch_action("pause");
    assert_eq!(expect_command(rx.recv().await.expect("msg")), SessionCommand::Pause);
}
