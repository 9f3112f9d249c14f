use super::*;
use crate::pool::DbConfig;
use catnap_core::{Cat, ErrorKind, FoodItem, MealTime, Service, ValidationError};

fn d(month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, month, day).unwrap()
}

/// A hotel with one room (20.00/night), one service (10.00), one food
/// item (5.00) and one cat owned by `u-1`. Today is 2024-05-01.
struct Hotel {
    engine: BookingEngine,
    admin: Actor,
    owner: Actor,
    room: Room,
    groom: Service,
    tuna: FoodItem,
    cat: Cat,
}

impl Hotel {
    async fn open(db: Database, policy: HoldPolicy) -> Hotel {
        let admin = Actor::admin("admin-1");
        let owner = Actor::customer("u-1");

        let catalog = db.catalog();
        let room = catalog
            .insert_room(&admin, "Sunny Loft", Money::from_cents(2000), 1)
            .await
            .unwrap();
        let groom = catalog
            .insert_service(&admin, "Grooming", Money::from_cents(1000))
            .await
            .unwrap();
        let tuna = catalog
            .insert_food(&admin, "Tuna Pate", Money::from_cents(500))
            .await
            .unwrap();
        let cat = db.cats().register(&owner, "u-1", "Miso").await.unwrap();

        let settings = EngineSettings {
            hold_policy: policy,
            ..EngineSettings::default()
        };
        let engine = BookingEngine::new(db)
            .with_settings(settings)
            .with_clock(Clock::Fixed(d(5, 1)));

        Hotel {
            engine,
            admin,
            owner,
            room,
            groom,
            tuna,
            cat,
        }
    }

    async fn in_memory(policy: HoldPolicy) -> Hotel {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        Hotel::open(db, policy).await
    }

    fn stay(&self, check_in: NaiveDate, check_out: NaiveDate) -> CreateBooking {
        CreateBooking::new(&self.cat.id, &self.room.id, check_in, check_out)
    }

    async fn book(&self, check_in: NaiveDate, check_out: NaiveDate) -> DbResult<Booking> {
        self.engine
            .create_booking(&self.owner, self.stay(check_in, check_out))
            .await
            .map(|details| details.booking)
    }

    async fn pay(&self, booking: &Booking) -> DbResult<Booking> {
        self.engine
            .confirm_payment(
                &self.admin,
                PaymentConfirmation {
                    booking_id: booking.id.clone(),
                    amount: booking.total_price(),
                    reference: Some(format!("pi_{}", booking.id)),
                },
            )
            .await
    }

    async fn booking_count(&self) -> i64 {
        self.engine.database().bookings().count().await.unwrap()
    }
}

fn domain(err: &DbError) -> &CoreError {
    err.as_domain()
        .unwrap_or_else(|| panic!("expected a domain error, got {err:?}"))
}

// =============================================================================
// Create
// =============================================================================

#[tokio::test]
async fn test_create_booking_captures_reference_price() {
    let hotel = Hotel::in_memory(HoldPolicy::Provisional).await;

    let request = hotel
        .stay(d(5, 10), d(5, 13))
        .with_service(ServiceRequest::new(&hotel.groom.id, 2))
        .with_food(FoodRequest {
            meal_time: Some(MealTime::Dinner),
            ..FoodRequest::new(&hotel.tuna.id, 1)
        })
        .with_special_requests("  Likes the window seat  ");

    let details = hotel.engine.create_booking(&hotel.owner, request).await.unwrap();
    let booking = &details.booking;

    assert_eq!(booking.status, BookingStatus::Pending);
    assert_eq!(booking.user_id, "u-1");
    assert_eq!(booking.total_days, 3);
    assert_eq!(booking.room_price_cents, 6000);
    assert_eq!(booking.services_price_cents, 2000);
    assert_eq!(booking.food_price_cents, 500);
    assert_eq!(booking.total_price_cents, 8500);
    assert_eq!(booking.special_requests.as_deref(), Some("Likes the window seat"));

    assert_eq!(details.services.len(), 1);
    assert_eq!(details.services[0].unit_price_cents, 1000);
    assert_eq!(details.services[0].price_cents, 2000);
    assert_eq!(details.services[0].service_date, d(5, 10));
    assert_eq!(details.food[0].meal_time, Some(MealTime::Dinner));

    let stored = hotel
        .engine
        .get_booking_details(&hotel.owner, &booking.id)
        .await
        .unwrap();
    assert_eq!(stored.booking.total_price_cents, 8500);
    assert_eq!(stored.services.len(), 1);
    assert_eq!(stored.food.len(), 1);
}

#[tokio::test]
async fn test_touching_stays_do_not_conflict() {
    let hotel = Hotel::in_memory(HoldPolicy::Provisional).await;

    let first = hotel.book(d(5, 10), d(5, 15)).await.unwrap();
    hotel.pay(&first).await.unwrap();

    let second = hotel.book(d(5, 15), d(5, 20)).await.unwrap();
    hotel.pay(&second).await.unwrap();

    assert_eq!(hotel.booking_count().await, 2);
}

#[tokio::test]
async fn test_overlapping_confirmed_stay_conflicts() {
    let hotel = Hotel::in_memory(HoldPolicy::Provisional).await;

    let first = hotel.book(d(5, 10), d(5, 15)).await.unwrap();
    hotel.pay(&first).await.unwrap();

    let err = hotel.book(d(5, 14), d(5, 16)).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Conflict);
    match domain(&err) {
        CoreError::Conflict {
            room_id,
            conflicting_booking_id,
            ..
        } => {
            assert_eq!(room_id, &hotel.room.id);
            assert_eq!(conflicting_booking_id, &first.id);
        }
        other => panic!("expected Conflict, got {other:?}"),
    }
    assert_eq!(hotel.booking_count().await, 1);
}

#[tokio::test]
async fn test_rejections_leave_no_rows() {
    let hotel = Hotel::in_memory(HoldPolicy::Provisional).await;

    let request = hotel
        .stay(d(5, 10), d(5, 12))
        .with_service(ServiceRequest::new(&hotel.groom.id, 1))
        .with_service(ServiceRequest::new("no-such-service", 1));

    let err = hotel.engine.create_booking(&hotel.owner, request).await.unwrap_err();
    assert!(matches!(
        domain(&err),
        CoreError::NotFound {
            entity: EntityKind::Service,
            ..
        }
    ));
    assert_eq!(hotel.booking_count().await, 0);

    // Inactive catalog items cannot be ordered
    hotel
        .engine
        .database()
        .catalog()
        .set_food_active(&hotel.admin, &hotel.tuna.id, false)
        .await
        .unwrap();
    let request = hotel
        .stay(d(5, 10), d(5, 12))
        .with_food(FoodRequest::new(&hotel.tuna.id, 1));
    let err = hotel.engine.create_booking(&hotel.owner, request).await.unwrap_err();
    assert!(matches!(domain(&err), CoreError::Inactive { .. }));
    assert_eq!(hotel.booking_count().await, 0);
}

#[tokio::test]
async fn test_create_validation_failures() {
    let hotel = Hotel::in_memory(HoldPolicy::Provisional).await;

    // check-in before today
    let err = hotel.book(d(4, 30), d(5, 3)).await.unwrap_err();
    assert!(matches!(
        domain(&err),
        CoreError::Validation(ValidationError::DateInPast { .. })
    ));

    // empty stay
    let err = hotel.book(d(5, 10), d(5, 10)).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Validation);

    // line date after check-out
    let request = hotel.stay(d(5, 10), d(5, 12)).with_service(ServiceRequest {
        service_date: Some(d(5, 13)),
        ..ServiceRequest::new(&hotel.groom.id, 1)
    });
    let err = hotel.engine.create_booking(&hotel.owner, request).await.unwrap_err();
    assert!(matches!(
        domain(&err),
        CoreError::Validation(ValidationError::DateOutsideStay { .. })
    ));

    // booking for today is fine
    assert!(hotel.book(d(5, 1), d(5, 2)).await.is_ok());
}

#[tokio::test]
async fn test_inactive_cat_and_unavailable_room() {
    let hotel = Hotel::in_memory(HoldPolicy::Provisional).await;
    let db = hotel.engine.database().clone();

    db.cats().set_active(&hotel.owner, &hotel.cat.id, false).await.unwrap();
    let err = hotel.book(d(5, 10), d(5, 12)).await.unwrap_err();
    assert!(matches!(
        domain(&err),
        CoreError::Inactive {
            entity: EntityKind::Cat,
            ..
        }
    ));
    db.cats().set_active(&hotel.owner, &hotel.cat.id, true).await.unwrap();

    db.catalog()
        .set_room_available(&hotel.admin, &hotel.room.id, false)
        .await
        .unwrap();
    let err = hotel.book(d(5, 10), d(5, 12)).await.unwrap_err();
    assert!(matches!(domain(&err), CoreError::RoomUnavailable { .. }));
    assert!(!hotel
        .engine
        .is_room_free(&hotel.room.id, d(5, 10), d(5, 12))
        .await
        .unwrap());

    let missing = CreateBooking::new(&hotel.cat.id, "no-such-room", d(5, 10), d(5, 12));
    let err = hotel.engine.create_booking(&hotel.owner, missing).await.unwrap_err();
    assert!(matches!(
        domain(&err),
        CoreError::NotFound {
            entity: EntityKind::Room,
            ..
        }
    ));
    assert_eq!(hotel.booking_count().await, 0);
}

#[tokio::test]
async fn test_customer_cannot_book_another_customers_cat() {
    let hotel = Hotel::in_memory(HoldPolicy::Provisional).await;
    let stranger = Actor::customer("u-2");

    let err = hotel
        .engine
        .create_booking(&stranger, hotel.stay(d(5, 10), d(5, 12)))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Forbidden);

    // An admin books on the owner's behalf; the booking belongs to the owner
    let details = hotel
        .engine
        .create_booking(&hotel.admin, hotel.stay(d(5, 10), d(5, 12)))
        .await
        .unwrap();
    assert_eq!(details.booking.user_id, "u-1");
}

// =============================================================================
// Hold Policy
// =============================================================================

#[tokio::test]
async fn test_provisional_holds_overlap_until_one_is_paid() {
    let hotel = Hotel::in_memory(HoldPolicy::Provisional).await;

    let first = hotel.book(d(5, 10), d(5, 15)).await.unwrap();
    let second = hotel.book(d(5, 12), d(5, 14)).await.unwrap();
    assert!(!hotel
        .engine
        .has_conflict(&hotel.room.id, d(5, 10), d(5, 15), None)
        .await
        .unwrap());

    hotel.pay(&first).await.unwrap();

    let err = hotel.pay(&second).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Conflict);
    let still = hotel.engine.get_booking(&hotel.owner, &second.id).await.unwrap();
    assert_eq!(still.status, BookingStatus::Pending);
    assert!(hotel
        .engine
        .database()
        .payments()
        .for_booking(&second.id)
        .await
        .unwrap()
        .is_none());

    let err = hotel.book(d(5, 13), d(5, 20)).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Conflict);
}

#[tokio::test]
async fn test_blocking_policy_pending_blocks() {
    let hotel = Hotel::in_memory(HoldPolicy::Blocking).await;

    let first = hotel.book(d(5, 10), d(5, 15)).await.unwrap();
    let err = hotel.book(d(5, 12), d(5, 14)).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Conflict);

    assert!(hotel
        .engine
        .has_conflict(&hotel.room.id, d(5, 12), d(5, 14), None)
        .await
        .unwrap());
    assert!(!hotel
        .engine
        .has_conflict(&hotel.room.id, d(5, 12), d(5, 14), Some(&first.id))
        .await
        .unwrap());

    // Paying for the only hold re-checks without tripping over itself
    hotel.pay(&first).await.unwrap();
}

// =============================================================================
// Transitions
// =============================================================================

#[tokio::test]
async fn test_full_lifecycle() {
    let hotel = Hotel::in_memory(HoldPolicy::Provisional).await;

    let booking = hotel.book(d(5, 10), d(5, 12)).await.unwrap();
    let confirmed = hotel.pay(&booking).await.unwrap();
    assert_eq!(confirmed.status, BookingStatus::Confirmed);

    let checked_in = hotel
        .engine
        .transition(&hotel.admin, &booking.id, BookingStatus::CheckedIn)
        .await
        .unwrap();
    assert_eq!(checked_in.status, BookingStatus::CheckedIn);

    let checked_out = hotel
        .engine
        .transition(&hotel.admin, &booking.id, BookingStatus::CheckedOut)
        .await
        .unwrap();
    assert_eq!(checked_out.status, BookingStatus::CheckedOut);

    // Terminal: nothing moves it back
    let err = hotel
        .engine
        .transition(&hotel.admin, &booking.id, BookingStatus::Confirmed)
        .await
        .unwrap_err();
    assert!(matches!(
        domain(&err),
        CoreError::InvalidTransition {
            from: BookingStatus::CheckedOut,
            to: BookingStatus::Confirmed,
        }
    ));
    let stored = hotel.engine.get_booking(&hotel.admin, &booking.id).await.unwrap();
    assert_eq!(stored.status, BookingStatus::CheckedOut);

    // Checked-out stays no longer block the room
    assert!(hotel
        .engine
        .is_room_free(&hotel.room.id, d(5, 10), d(5, 12))
        .await
        .unwrap());
}

#[tokio::test]
async fn test_cancel_frees_the_room() {
    let hotel = Hotel::in_memory(HoldPolicy::Provisional).await;

    let booking = hotel.book(d(5, 10), d(5, 15)).await.unwrap();
    hotel.pay(&booking).await.unwrap();
    assert!(hotel.book(d(5, 11), d(5, 12)).await.is_err());

    let cancelled = hotel.engine.cancel(&hotel.owner, &booking.id).await.unwrap();
    assert_eq!(cancelled.status, BookingStatus::Cancelled);

    let rooms = hotel.engine.available_rooms(d(5, 10), d(5, 15)).await.unwrap();
    assert_eq!(rooms.len(), 1);
    assert!(hotel.book(d(5, 11), d(5, 12)).await.is_ok());

    // Cancelling twice is an illegal transition
    let err = hotel.engine.cancel(&hotel.owner, &booking.id).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Transition);

    // Another customer cannot tell it was already cancelled
    let err = hotel
        .engine
        .cancel(&Actor::customer("u-2"), &booking.id)
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Forbidden);
}

#[tokio::test]
async fn test_only_admins_drive_the_stay() {
    let hotel = Hotel::in_memory(HoldPolicy::Provisional).await;
    let booking = hotel.book(d(5, 10), d(5, 12)).await.unwrap();

    let err = hotel
        .engine
        .transition(&hotel.owner, &booking.id, BookingStatus::Confirmed)
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Forbidden);

    let err = hotel
        .engine
        .cancel(&Actor::customer("u-2"), &booking.id)
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Forbidden);

    let err = hotel
        .engine
        .transition(&hotel.admin, "no-such-booking", BookingStatus::Cancelled)
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);
}

// =============================================================================
// Payment
// =============================================================================

#[tokio::test]
async fn test_payment_must_match_total() {
    let hotel = Hotel::in_memory(HoldPolicy::Provisional).await;
    let booking = hotel.book(d(5, 10), d(5, 12)).await.unwrap();
    assert_eq!(booking.total_price_cents, 4000);

    let signal = |cents| PaymentConfirmation {
        booking_id: booking.id.clone(),
        amount: Money::from_cents(cents),
        reference: None,
    };

    let err = hotel
        .engine
        .confirm_payment(&hotel.admin, signal(3998))
        .await
        .unwrap_err();
    assert!(matches!(domain(&err), CoreError::PaymentMismatch { .. }));

    let err = hotel
        .engine
        .confirm_payment(&hotel.owner, signal(4000))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Forbidden);

    // Within the one-cent tolerance
    let confirmed = hotel
        .engine
        .confirm_payment(&hotel.admin, signal(3999))
        .await
        .unwrap();
    assert_eq!(confirmed.status, BookingStatus::Confirmed);

    let payment = hotel
        .engine
        .database()
        .payments()
        .for_booking(&booking.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(payment.amount_cents, 3999);

    // A duplicate signal is rejected and records nothing
    let err = hotel
        .engine
        .confirm_payment(&hotel.admin, signal(4000))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Transition);
    assert_eq!(
        hotel
            .engine
            .database()
            .payments()
            .total_received_cents()
            .await
            .unwrap(),
        3999
    );
}

#[tokio::test]
async fn test_wide_tolerance_setting_is_capped() {
    let hotel = Hotel::in_memory(HoldPolicy::Provisional).await;
    let engine = hotel.engine.clone().with_settings(EngineSettings {
        payment_tolerance: Money::from_cents(500),
        ..EngineSettings::default()
    });
    let booking = hotel.book(d(5, 10), d(5, 12)).await.unwrap();

    let err = engine
        .confirm_payment(
            &hotel.admin,
            PaymentConfirmation {
                booking_id: booking.id.clone(),
                amount: Money::from_cents(booking.total_price_cents - 400),
                reference: None,
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(domain(&err), CoreError::PaymentMismatch { .. }));
}

#[tokio::test]
async fn test_catalog_price_change_does_not_touch_existing_bookings() {
    let hotel = Hotel::in_memory(HoldPolicy::Provisional).await;

    let request = hotel
        .stay(d(5, 10), d(5, 13))
        .with_service(ServiceRequest::new(&hotel.groom.id, 2))
        .with_food(FoodRequest::new(&hotel.tuna.id, 1));
    let created = hotel.engine.create_booking(&hotel.owner, request).await.unwrap();

    let catalog = hotel.engine.database().catalog();
    catalog
        .set_room_price(&hotel.admin, &hotel.room.id, Money::from_cents(9900))
        .await
        .unwrap();
    catalog
        .set_service_price(&hotel.admin, &hotel.groom.id, Money::from_cents(4200))
        .await
        .unwrap();

    let stored = hotel
        .engine
        .get_booking_details(&hotel.admin, &created.booking.id)
        .await
        .unwrap();
    assert_eq!(stored.booking.total_price_cents, 8500);
    assert_eq!(stored.services[0].unit_price_cents, 1000);

    // Payment is matched against the captured total
    hotel.pay(&stored.booking).await.unwrap();
}

// =============================================================================
// Reads
// =============================================================================

#[tokio::test]
async fn test_reads_are_scoped_to_the_owner() {
    let hotel = Hotel::in_memory(HoldPolicy::Provisional).await;
    let other = Actor::customer("u-2");
    let other_cat = hotel
        .engine
        .database()
        .cats()
        .register(&other, "u-2", "Pixel")
        .await
        .unwrap();

    let mine = hotel.book(d(5, 10), d(5, 12)).await.unwrap();
    hotel
        .engine
        .create_booking(
            &other,
            CreateBooking::new(&other_cat.id, &hotel.room.id, d(6, 1), d(6, 3)),
        )
        .await
        .unwrap();

    let err = hotel.engine.get_booking(&other, &mine.id).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Forbidden);

    let listed = hotel
        .engine
        .list_bookings(&hotel.owner, BookingFilter::default())
        .await
        .unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].id, mine.id);

    let err = hotel
        .engine
        .list_bookings(&hotel.owner, BookingFilter::for_user("u-2"))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Forbidden);

    let all = hotel
        .engine
        .list_bookings(&hotel.admin, BookingFilter::default().room(&hotel.room.id))
        .await
        .unwrap();
    assert_eq!(all.len(), 2);

    let june = StayPeriod::new(d(6, 1), d(7, 1)).unwrap();
    let in_june = hotel
        .engine
        .list_bookings(&hotel.admin, BookingFilter::default().overlapping(june))
        .await
        .unwrap();
    assert_eq!(in_june.len(), 1);
    assert_eq!(in_june[0].user_id, "u-2");
}

// =============================================================================
// Concurrency
// =============================================================================

async fn file_hotel(dir: &tempfile::TempDir, policy: HoldPolicy) -> Hotel {
    let config = DbConfig::new(dir.path().join("hotel.db"))
        .max_connections(8)
        .busy_timeout(Duration::from_secs(5));
    let db = Database::new(config).await.unwrap();
    Hotel::open(db, policy).await
}

fn assert_send<T: Send>(_: &T) {}

#[tokio::test]
async fn test_unit_of_work_futures_are_send() {
    let hotel = Hotel::in_memory(HoldPolicy::Provisional).await;

    let request = hotel
        .stay(d(5, 10), d(5, 12))
        .with_service(ServiceRequest::new(&hotel.groom.id, 1))
        .with_food(FoodRequest::new(&hotel.tuna.id, 1));
    let create = hotel.engine.create_booking(&hotel.owner, request);
    assert_send(&create);
    let booking = create.await.unwrap().booking;

    let pay = hotel.engine.confirm_payment(
        &hotel.admin,
        PaymentConfirmation {
            booking_id: booking.id.clone(),
            amount: booking.total_price(),
            reference: None,
        },
    );
    assert_send(&pay);
    pay.await.unwrap();

    let cancel = hotel.engine.cancel(&hotel.owner, &booking.id);
    assert_send(&cancel);
    cancel.await.unwrap();
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_creates_admit_exactly_one() {
    let dir = tempfile::tempdir().unwrap();
    let hotel = file_hotel(&dir, HoldPolicy::Blocking).await;

    let mut handles = Vec::new();
    for _ in 0..8 {
        let engine = hotel.engine.clone();
        let owner = hotel.owner.clone();
        let request = hotel.stay(d(5, 10), d(5, 15));
        handles.push(tokio::spawn(async move {
            engine.create_booking(&owner, request).await
        }));
    }

    let mut created = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(_) => created += 1,
            Err(err) => assert_eq!(err.kind(), ErrorKind::Conflict, "{err}"),
        }
    }

    assert_eq!(created, 1);
    assert_eq!(hotel.booking_count().await, 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_payments_confirm_exactly_one() {
    let dir = tempfile::tempdir().unwrap();
    let hotel = file_hotel(&dir, HoldPolicy::Provisional).await;

    let mut holds = Vec::new();
    for _ in 0..4 {
        holds.push(hotel.book(d(5, 10), d(5, 15)).await.unwrap());
    }

    let mut handles = Vec::new();
    for hold in &holds {
        let engine = hotel.engine.clone();
        let admin = hotel.admin.clone();
        let signal = PaymentConfirmation {
            booking_id: hold.id.clone(),
            amount: hold.total_price(),
            reference: None,
        };
        handles.push(tokio::spawn(async move {
            engine.confirm_payment(&admin, signal).await
        }));
    }

    let mut confirmed = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(_) => confirmed += 1,
            Err(err) => assert_eq!(err.kind(), ErrorKind::Conflict, "{err}"),
        }
    }
    assert_eq!(confirmed, 1);

    let confirmed = hotel
        .engine
        .list_bookings(
            &hotel.admin,
            BookingFilter::default().status(BookingStatus::Confirmed),
        )
        .await
        .unwrap();
    assert_eq!(confirmed.len(), 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_lock_wait_past_deadline_times_out() {
    let dir = tempfile::tempdir().unwrap();
    let hotel = file_hotel(&dir, HoldPolicy::Provisional).await;
    let engine = hotel.engine.clone().with_settings(EngineSettings {
        unit_of_work_timeout: Duration::from_millis(200),
        ..EngineSettings::default()
    });

    // Another writer holds the lock
    let pool = engine.database().pool().clone();
    let mut holder = pool.begin().await.unwrap();
    sqlx::query("UPDATE rooms SET updated_at = updated_at")
        .execute(&mut *holder)
        .await
        .unwrap();

    let err = engine
        .create_booking(&hotel.owner, hotel.stay(d(5, 10), d(5, 12)))
        .await
        .unwrap_err();
    assert!(matches!(err, DbError::Timeout { .. }));
    assert!(err.is_retryable());

    holder.rollback().await.unwrap();
}

// =============================================================================
// Settings
// =============================================================================

#[test]
fn test_fixed_clock() {
    assert_eq!(Clock::Fixed(d(5, 1)).today(), d(5, 1));
}

#[test]
fn test_default_settings() {
    let settings = EngineSettings::default();
    assert_eq!(settings.payment_tolerance, Money::from_cents(1));
    assert_eq!(settings.hold_policy, HoldPolicy::Provisional);
    assert_eq!(settings.unit_of_work_timeout, Duration::from_secs(10));
}
