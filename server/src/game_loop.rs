use crate::ball::{Ball, BallError};
use crate::config::ServerConfig;
use crate::replication::ObserverChannel;
use crate::state::SimState;
use std::time::Duration;
use tokio::sync::{mpsc, oneshot};

/// Commands into the game loop. Everything that touches the ball
/// collection or the observer set goes through here.
pub enum GameCommand {
    RegisterObserver {
        channel: ObserverChannel,
    },
    AddBall {
        ball: Ball,
    },
    AddBallOfMass {
        mass: i32,
        response: oneshot::Sender<Result<(), BallError>>,
    },
    Shoot {
        index: usize,
        response: oneshot::Sender<bool>,
    },
    SetVelocity {
        index: usize,
        vx: i32,
        vy: i32,
        response: oneshot::Sender<bool>,
    },
    Snapshot {
        response: oneshot::Sender<Vec<Ball>>,
    },
}

/// Run the simulation loop. Owns all simulation state.
pub async fn run_game_loop(cmd_rx: mpsc::Receiver<GameCommand>, config: ServerConfig) {
    let state = SimState::new(&config);
    run_game_loop_with_state(cmd_rx, state, Duration::from_millis(config.tick_period_ms)).await;
}

/// Run the loop over a prepared state.
pub async fn run_game_loop_with_state(
    mut cmd_rx: mpsc::Receiver<GameCommand>,
    mut state: SimState,
    tick_period: Duration,
) {
    let mut tick_interval = tokio::time::interval(tick_period);
    tick_interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

    tracing::info!(
        "Simulation started with {} balls, tick every {:?}",
        state.balls().len(),
        tick_period
    );

    loop {
        tokio::select! {
            _ = tick_interval.tick() => {
                let report = state.tick();
                if report.failed > 0 {
                    tracing::trace!(
                        "Tick {}: delivered {}, failed {}",
                        state.tick_count(),
                        report.delivered,
                        report.failed
                    );
                }
            }

            cmd = cmd_rx.recv() => {
                let Some(cmd) = cmd else { break };
                handle_command(&mut state, cmd);
            }
        }
    }

    tracing::info!("Simulation loop ended after {} ticks", state.tick_count());
}

fn handle_command(state: &mut SimState, cmd: GameCommand) {
    match cmd {
        GameCommand::RegisterObserver { channel } => {
            state.register_observer(channel);
            tracing::info!("{} observers registered", state.observer_count());
        }
        GameCommand::AddBall { ball } => {
            tracing::debug!("Adding ball {}", ball);
            state.add_ball(ball);
        }
        GameCommand::AddBallOfMass { mass, response } => {
            let result = state.add_ball_of_mass(mass);
            if let Err(e) = &result {
                tracing::warn!("Rejected ball of mass {}: {}", mass, e);
            }
            let _ = response.send(result);
        }
        GameCommand::Shoot { index, response } => {
            let _ = response.send(state.shoot(index));
        }
        GameCommand::SetVelocity {
            index,
            vx,
            vy,
            response,
        } => {
            let _ = response.send(state.set_velocity(index, vx, vy));
        }
        GameCommand::Snapshot { response } => {
            let _ = response.send(state.balls().to_vec());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> ServerConfig {
        ServerConfig {
            rng_seed: 7,
            tick_period_ms: 1000,
            ..Default::default()
        }
    }

    async fn snapshot(tx: &mpsc::Sender<GameCommand>) -> Vec<Ball> {
        let (resp_tx, resp_rx) = oneshot::channel();
        tx.send(GameCommand::Snapshot { response: resp_tx })
            .await
            .unwrap();
        resp_rx.await.unwrap()
    }

    #[tokio::test]
    async fn commands_mutate_owned_state() {
        let (tx, rx) = mpsc::channel(16);
        let handle = tokio::spawn(run_game_loop(rx, test_config()));

        let (resp_tx, resp_rx) = oneshot::channel();
        tx.send(GameCommand::AddBallOfMass {
            mass: 33,
            response: resp_tx,
        })
        .await
        .unwrap();
        assert!(resp_rx.await.unwrap().is_ok());

        let balls = snapshot(&tx).await;
        assert_eq!(balls.len(), 3);
        assert_eq!(balls[2].radius(), 33);

        let (resp_tx, resp_rx) = oneshot::channel();
        tx.send(GameCommand::SetVelocity {
            index: 2,
            vx: -4,
            vy: 1,
            response: resp_tx,
        })
        .await
        .unwrap();
        assert!(resp_rx.await.unwrap());
        assert_eq!(snapshot(&tx).await[2].velocity(), (-4, 1));

        let (resp_tx, resp_rx) = oneshot::channel();
        tx.send(GameCommand::Shoot {
            index: 10,
            response: resp_tx,
        })
        .await
        .unwrap();
        assert!(!resp_rx.await.unwrap());

        drop(tx);
        handle.await.unwrap();
    }

    #[tokio::test]
    async fn registered_observer_receives_ticks() {
        let config = ServerConfig {
            tick_period_ms: 5,
            ..test_config()
        };
        let (tx, rx) = mpsc::channel(16);
        let handle = tokio::spawn(run_game_loop(rx, config));

        let (channel, mut snapshots) = ObserverChannel::new(1, 64);
        tx.send(GameCommand::RegisterObserver { channel })
            .await
            .unwrap();

        for _ in 0..3 {
            let snapshot = tokio::time::timeout(Duration::from_secs(2), snapshots.recv())
                .await
                .unwrap()
                .unwrap();
            assert_eq!(snapshot.balls.len(), 2);
        }

        drop(tx);
        handle.await.unwrap();
    }
}
