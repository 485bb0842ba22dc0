use criterion::Criterion;
use criterion::criterion_group;
use criterion::criterion_main;
use mcaixi::agent::Agent;
use mcaixi::config::EnvironmentKind;
use mcaixi::config::Settings;
use mcaixi::model::ContextTree;
use mcaixi::search::search;
use rand::Rng;
use rand::SeedableRng;
use rand::rngs::SmallRng;

fn settings() -> Settings {
    Settings {
        environment: EnvironmentKind::CoinFlip,
        ct_depth: 16,
        agent_horizon: 6,
        mc_simulations: 200,
        agent_actions: 2,
        observation_bits: 1,
        reward_bits: 1,
        exploration: 0.0,
        explore_decay: 1.0,
        terminate_age: None,
        seed: 0,
        coin_flip_p: 0.7,
        left_door_p: 0.5,
        listen_p: 0.85,
    }
}

fn model_throughput(c: &mut Criterion) {
    c.bench_function("absorb 1k bits at depth 16", |b| {
        let mut rng = SmallRng::seed_from_u64(1);
        b.iter(|| {
            let mut tree = ContextTree::new(16);
            for _ in 0..1000 {
                tree.update(rng.random());
            }
            tree.log_block_probability()
        })
    });
}

fn planner_decision(c: &mut Criterion) {
    c.bench_function("one decision of 200 simulations", |b| {
        let mut rng = SmallRng::seed_from_u64(2);
        let mut agent = Agent::new(&settings());
        for _ in 0..50 {
            agent.model_update_percept(rng.random_range(0..2), rng.random_range(0..2));
            agent.model_update_action(rng.random_range(0..2));
        }
        agent.model_update_percept(1, 1);
        b.iter(|| {
            let action = search(&mut agent, &mut rng);
            action
        })
    });
}

criterion_group!(benches, model_throughput, planner_decision);
criterion_main!(benches);
