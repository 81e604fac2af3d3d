use criterion::{criterion_group, criterion_main, Criterion};
use interview_prep::models::leaderboard::compute_leaderboard;
use interview_prep::models::{Feedback, FeedbackType, User};
use std::hint::black_box;

fn make_users(count: usize) -> Vec<User> {
    (0..count)
        .map(|i| User {
            id: format!("user-{i:04}"),
            name: format!("User {i}"),
            email: format!("user{i}@example.com"),
            subscription: i % 3 == 0,
            created_at: None,
            photo_url: None,
        })
        .collect()
}

fn make_feedback(users: usize, per_user: usize) -> Vec<Feedback> {
    (0..users * per_user)
        .map(|i| Feedback {
            id: format!("fb-{i:06}"),
            interview_id: format!("int-{i:06}"),
            user_id: format!("user-{:04}", i % users),
            // Spread scores so the sort has real work to do
            total_score: ((i * 37) % 101) as f64 + 0.5 * (i % 2) as f64,
            category_scores: Vec::new(),
            strengths: Vec::new(),
            areas_for_improvement: Vec::new(),
            final_assessment: String::new(),
            feedback_type: Some(FeedbackType::Voice),
            created_at: "2025-01-01T00:00:00Z".to_string(),
        })
        .collect()
}

fn benchmark_compute_leaderboard(c: &mut Criterion) {
    let mut group = c.benchmark_group("compute_leaderboard");

    for (users, per_user) in [(50, 4), (500, 10)] {
        let user_rows = make_users(users);
        let feedback_rows = make_feedback(users, per_user);

        group.bench_function(format!("{users}_users_{per_user}_each"), |b| {
            b.iter(|| compute_leaderboard(black_box(&user_rows), black_box(&feedback_rows)))
        });
    }

    group.finish();
}

criterion_group!(benches, benchmark_compute_leaderboard);
criterion_main!(benches);
