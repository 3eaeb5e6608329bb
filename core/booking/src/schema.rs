table! {
    bk_availability (id) {
        id -> Text,
        provider_id -> BigInt,
        engagement_id -> Text,
        day -> Date,
        start_time -> Time,
        end_time -> Time,
        status -> Text,
    }
}

table! {
    bk_customer_leave (id) {
        id -> Text,
        customer_id -> BigInt,
        engagement_id -> Text,
        leave_start -> Date,
        leave_end -> Date,
        total_days -> Integer,
        refund_amount -> Text,
        status -> Text,
        created_at -> Timestamp,
    }
}

table! {
    bk_engagement (id) {
        id -> Text,
        customer_id -> BigInt,
        provider_id -> Nullable<BigInt>,
        booking_type -> Text,
        service_type -> Text,
        responsibilities -> Text,
        base_amount -> Text,
        start_date -> Date,
        end_date -> Date,
        start_time -> Time,
        end_time -> Time,
        task_status -> Text,
        assignment_status -> Text,
        active -> Bool,
        vacation_start -> Nullable<Date>,
        vacation_end -> Nullable<Date>,
        leave_days -> Nullable<Integer>,
        created_at -> Timestamp,
        updated_at -> Timestamp,
    }
}

table! {
    bk_modification (id) {
        id -> Text,
        engagement_id -> Text,
        modification_type -> Text,
        payload -> Text,
        actor_id -> Nullable<BigInt>,
        actor_role -> Nullable<Text>,
        created_at -> Timestamp,
    }
}

table! {
    bk_payment (id) {
        id -> Text,
        engagement_id -> Text,
        base_amount -> Text,
        platform_fee -> Text,
        gst -> Text,
        total_amount -> Text,
        payment_mode -> Text,
        order_ref -> Nullable<Text>,
        transaction_id -> Nullable<Text>,
        status -> Text,
        created_at -> Timestamp,
    }
}

table! {
    bk_payout (id) {
        id -> Text,
        provider_id -> BigInt,
        engagement_id -> Text,
        gross_amount -> Text,
        provider_fee -> Text,
        tds_amount -> Text,
        net_amount -> Text,
        payout_mode -> Nullable<Text>,
        status -> Text,
        created_at -> Timestamp,
    }
}

table! {
    bk_provider (id) {
        id -> BigInt,
        name -> Text,
        active -> Bool,
        latitude -> Nullable<Double>,
        longitude -> Nullable<Double>,
        created_at -> Timestamp,
    }
}

table! {
    bk_wallet (id) {
        id -> Text,
        owner_kind -> Text,
        owner_id -> BigInt,
        balance -> Text,
        security_deposit_collected -> Text,
        created_at -> Timestamp,
        updated_at -> Timestamp,
    }
}

table! {
    bk_wallet_tx (id) {
        id -> Text,
        wallet_id -> Text,
        engagement_id -> Nullable<Text>,
        tx_type -> Text,
        amount -> Text,
        description -> Text,
        balance_after -> Text,
        created_at -> Timestamp,
    }
}
