//! End-to-end runs against an in-memory rig: lines go in through the gateway, commands
//! come out of the shared writer.

use std::sync::Arc;
use std::time::Duration;

use tokio::io::{duplex, AsyncBufReadExt, AsyncWriteExt, BufReader, DuplexStream, Lines};
use tokio::task::JoinSet;
use tokio::time::{sleep, timeout};

use elevatordispatch::config::Settings;
use elevatordispatch::elevio::writer::CommandWriter;
use elevatordispatch::elevator_logic::queue::SweepQueue;
use elevatordispatch::elevio::{Direction, FloorLevel};
use elevatordispatch::manager::{Dispatcher, Fleet};
use elevatordispatch::network;

struct Rig {
    dispatcher: Dispatcher,
    input: DuplexStream,
    output: Lines<BufReader<DuplexStream>>,
    _tasks: JoinSet<anyhow::Result<()>>,
}

impl Rig {
    fn start(cars: u8) -> Self {
        let settings = Settings { cars, ..Settings::default() };
        let (gateway_out, rig_out) = duplex(4096);
        let (rig_in, gateway_in) = duplex(4096);

        let writer = CommandWriter::new(gateway_out, settings.write_timeout());
        let dispatcher = Dispatcher::new(Arc::new(Fleet::new(&settings, writer).unwrap()));

        let mut tasks = dispatcher.spawn_cars();
        let gateway = dispatcher.clone();
        let limits = settings.limits();
        tasks.spawn(async move { network::serve(BufReader::new(gateway_in), &gateway, limits).await });

        Rig {
            dispatcher,
            input: rig_in,
            output: BufReader::new(rig_out).lines(),
            _tasks: tasks,
        }
    }

    async fn send(&mut self, line: &str) {
        self.input.write_all(line.as_bytes()).await.unwrap();
        self.input.write_all(b"\n").await.unwrap();
    }

    /// Next motor or door command. Display updates are skipped.
    async fn next_command(&mut self) -> String {
        loop {
            let line = timeout(Duration::from_secs(30), self.output.next_line())
                .await
                .expect("no command within 30 s")
                .unwrap()
                .expect("writer closed");
            if !line.starts_with("s ") {
                return line;
            }
        }
    }
}

#[tokio::test(start_paused = true)]
async fn single_car_serves_a_hall_call() {
    let mut rig = Rig::start(1);

    rig.send("b 5 1").await;
    assert_eq!(rig.next_command().await, "m 1 1");

    rig.send("f 1 4.96").await;
    assert_eq!(rig.next_command().await, "m 1 0");
    assert_eq!(rig.next_command().await, "d 1 1");
    assert_eq!(rig.next_command().await, "d 1 -1");

    sleep(Duration::from_secs(1)).await;
    let state = &rig.dispatcher.snapshot().await[0];
    assert!(state.idle);
    assert_eq!(state.queued(), 0);
    assert_eq!(state.target, None);
}

#[tokio::test(start_paused = true)]
async fn idle_tie_goes_to_car_one_then_busy_car_is_skipped() {
    let mut rig = Rig::start(2);

    rig.send("b 3 1").await;
    assert_eq!(rig.next_command().await, "m 1 1");

    rig.send("b 1 -1").await;
    assert_eq!(rig.next_command().await, "m 2 1");

    let states = rig.dispatcher.snapshot().await;
    assert_eq!(states[0].up_queue.as_slice(), &[FloorLevel::from_floor(3)]);
    assert_eq!(states[1].down_queue.as_slice(), &[FloorLevel::from_floor(1)]);
}

#[tokio::test]
async fn hall_call_lands_in_sorted_position() {
    let settings = Settings { cars: 1, top_floor: 6, ..Settings::default() };
    let writer = CommandWriter::new(tokio::io::sink(), settings.write_timeout());
    let dispatcher = Dispatcher::new(Arc::new(Fleet::new(&settings, writer).unwrap()));

    dispatcher.report_position(1, FloorLevel::from_floor(2)).await;
    dispatcher.handle_car_call(1, FloorLevel::from_floor(4)).await;
    dispatcher.handle_car_call(1, FloorLevel::from_floor(6)).await;
    dispatcher.handle_hall_call(FloorLevel::from_floor(3), Direction::Up).await;

    let state = &dispatcher.snapshot().await[0];
    assert_eq!(state.direction, Direction::Up);
    assert_eq!(
        state.up_queue.as_slice(),
        &[FloorLevel::from_floor(3), FloorLevel::from_floor(4), FloorLevel::from_floor(6)]
    );
}

#[tokio::test(start_paused = true)]
async fn malformed_line_does_not_stop_the_gateway() {
    let mut rig = Rig::start(1);

    rig.send("x 1 2").await;
    rig.send("p 1 3").await;
    assert_eq!(rig.next_command().await, "m 1 1");
    assert!(rig.dispatcher.snapshot().await[0].up_queue.contains(FloorLevel::from_floor(3)));
}

#[tokio::test(start_paused = true)]
async fn stop_overrides_motion() {
    let mut rig = Rig::start(1);

    rig.send("p 1 4").await;
    assert_eq!(rig.next_command().await, "m 1 1");
    rig.send("p 1 32000").await;
    assert_eq!(rig.next_command().await, "m 1 0");
    assert_eq!(rig.dispatcher.snapshot().await[0].queued(), 1);
}

#[tokio::test(start_paused = true)]
async fn hall_call_at_the_car_opens_the_doors_in_place() {
    let mut rig = Rig::start(1);

    rig.send("b 0 1").await;
    assert_eq!(rig.next_command().await, "m 1 0");
    assert_eq!(rig.next_command().await, "d 1 1");
    assert_eq!(rig.next_command().await, "d 1 -1");
}

fn in_sweep_order(queue: &SweepQueue) -> bool {
    queue.as_slice().windows(2).all(|pair| match queue.direction() {
        Direction::Up => pair[0] < pair[1],
        Direction::Down => pair[0] > pair[1],
    })
}

#[tokio::test(start_paused = true)]
async fn queues_stay_ordered_while_the_fleet_runs() {
    let Rig { dispatcher, mut input, output, _tasks } = Rig::start(3);
    let drain = tokio::spawn(async move {
        let mut output = output;
        while let Ok(Some(_)) = output.next_line().await {}
    });

    for round in 0..60u32 {
        let floor = (round * 7) % 6;
        let car = round % 3 + 1;
        let direction = if round % 2 == 0 { 1 } else { -1 };
        let position = f64::from((round * 3) % 6) + 0.5;
        let batch = format!("b {floor} {direction}\np {car} {}\nf {car} {position}\n", (floor + 2) % 6);
        input.write_all(batch.as_bytes()).await.unwrap();

        sleep(Duration::from_millis(15)).await;
        for state in dispatcher.snapshot().await {
            assert!(in_sweep_order(&state.up_queue), "car {} up queue {:?}", state.id, state.up_queue);
            assert!(in_sweep_order(&state.down_queue), "car {} down queue {:?}", state.id, state.down_queue);
            assert_eq!(state.up_queue.direction(), Direction::Up);
            assert_eq!(state.down_queue.direction(), Direction::Down);
        }
    }

    drop(input);
    drain.abort();
}
