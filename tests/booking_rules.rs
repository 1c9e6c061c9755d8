//! Reglas de negocio del booking que no necesitan base de datos:
//! solape de ventanas, máquina de estados, agregado de rating y tokens.

use chrono::{DateTime, Duration, TimeZone, Utc};
use vehicle_rental::models::rental::{windows_overlap, RentalStatus};
use vehicle_rental::models::user::UserRole;
use vehicle_rental::models::vehicle::RatingAggregate;
use vehicle_rental::utils::jwt::{generate_token, verify_token};

fn jan1(hour: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 1, 1, hour, 0, 0).unwrap()
}

#[test]
fn test_touching_windows_are_not_a_conflict() {
    // [10:00, 11:00) contra un alquiler aprobado [11:00, 12:00): los
    // extremos que se tocan no chocan, la ventana es semiabierta
    assert!(!windows_overlap(jan1(10), jan1(11), jan1(11), jan1(12)));
}

#[test]
fn test_half_overlapping_windows_conflict() {
    // [10:00, 11:00) contra [10:30, 11:30)
    let half = Duration::minutes(30);
    assert!(windows_overlap(
        jan1(10),
        jan1(11),
        jan1(10) + half,
        jan1(11) + half
    ));
}

#[test]
fn test_two_renters_scenario() {
    // Renter A pide [10:00, 12:00), renter B pide [11:00, 13:00): las
    // ventanas se solapan, así que tras aprobar A la solicitud de B tiene
    // que chocar contra el chequeo approved-only
    let a = (jan1(10), jan1(12));
    let b = (jan1(11), jan1(13));

    assert!(windows_overlap(a.0, a.1, b.0, b.1));

    // A se aprueba: pending → approved es una transición válida
    assert!(RentalStatus::Pending.can_transition_to(RentalStatus::Approved));

    // B sigue pending y puede rechazarse explícitamente
    assert!(RentalStatus::Pending.can_transition_to(RentalStatus::Rejected));

    // Pero un alquiler ya rechazado no vuelve a ningún estado
    assert!(!RentalStatus::Rejected.can_transition_to(RentalStatus::Pending));
    assert!(!RentalStatus::Rejected.can_transition_to(RentalStatus::Approved));
}

#[test]
fn test_only_pending_and_approved_occupy_the_window() {
    // La búsqueda de disponibilidad y el chequeo de creación solo cuentan
    // estados que bloquean la ventana
    let blocking: Vec<RentalStatus> = [
        RentalStatus::Pending,
        RentalStatus::Approved,
        RentalStatus::Rejected,
        RentalStatus::Cancelled,
        RentalStatus::Completed,
    ]
    .into_iter()
    .filter(|s| s.blocks_window())
    .collect();

    assert_eq!(blocking, vec![RentalStatus::Pending, RentalStatus::Approved]);
}

#[test]
fn test_terminal_states_allow_no_transition() {
    for terminal in [
        RentalStatus::Rejected,
        RentalStatus::Cancelled,
        RentalStatus::Completed,
    ] {
        for next in [
            RentalStatus::Pending,
            RentalStatus::Approved,
            RentalStatus::Rejected,
            RentalStatus::Cancelled,
            RentalStatus::Completed,
        ] {
            assert!(
                !terminal.can_transition_to(next),
                "{:?} should be terminal",
                terminal
            );
        }
    }
}

#[test]
fn test_rating_average_matches_sum_over_n() {
    let scores = [4u8, 5, 3, 5, 1, 2, 4, 5];
    let mut agg = RatingAggregate::new(0.0, 0);
    for s in scores {
        agg = agg.apply(s);
    }

    let expected = scores.iter().map(|&s| s as f64).sum::<f64>() / scores.len() as f64;
    assert_eq!(agg.count, scores.len() as i32);
    assert!((agg.average - expected).abs() < 1e-9);
    // La media de puntuaciones en [1,5] queda siempre en [0,5]
    assert!(agg.average >= 0.0 && agg.average <= 5.0);
}

#[test]
fn test_rating_average_is_submission_order_independent() {
    let scores = [5u8, 1, 3, 4, 2];
    let mut shuffled = scores;
    shuffled.reverse();

    let apply_all = |scores: &[u8]| {
        scores
            .iter()
            .fold(RatingAggregate::new(0.0, 0), |agg, &s| agg.apply(s))
    };

    let a = apply_all(&scores);
    let b = apply_all(&shuffled);

    assert!((a.average - b.average).abs() < 1e-9);
    assert_eq!(a.count, b.count);
}

#[test]
fn test_jwt_carries_actor_identity_and_role() {
    let renter = uuid::Uuid::new_v4();
    let token = generate_token(renter, UserRole::User, "secret", 3600).unwrap();

    let claims = verify_token(&token, "secret").unwrap();
    assert_eq!(claims.sub, renter.to_string());
    assert_eq!(claims.role, UserRole::User);
}

#[test]
fn test_status_names_match_wire_format() {
    assert_eq!(RentalStatus::Pending.as_str(), "pending");
    assert_eq!(RentalStatus::parse("approved"), Some(RentalStatus::Approved));
    // El filtro ?status= de /requests rechaza nombres desconocidos
    assert_eq!(RentalStatus::parse("PENDING"), None);
}
