mod common;

use std::thread;

use common::{ADA, BOB, CY, fixture};
use huddle_core::CoreError;

#[test]
fn fifty_one_messages_span_two_pages() {
    let f = fixture();
    let g = f.store.create_channel(ADA, "G", true).unwrap();
    for _ in 0..51 {
        f.store.send(g, ADA, "x").unwrap();
    }

    let first = f.store.page(g, ADA, 0).unwrap();
    assert_eq!(first.messages.len(), 50);
    assert_eq!(first.start, 0);
    assert_eq!(first.end, 50);

    let second = f.store.page(g, ADA, 50).unwrap();
    assert_eq!(second.messages.len(), 1);
    assert_eq!(second.end, -1);

    assert!(matches!(
        f.store.page(g, ADA, 52),
        Err(CoreError::InvalidArgument(_))
    ));
}

#[test]
fn pages_are_strictly_newest_first() {
    let f = fixture();
    let g = f.store.create_channel(ADA, "G", true).unwrap();
    for n in [1usize, 7, 50] {
        let ch = f.store.create_channel(ADA, &format!("c{n}"), true).unwrap();
        for i in 0..n {
            f.store.send(ch, ADA, &format!("m{i}")).unwrap();
            // Interleave another channel so ids are not contiguous.
            f.store.send(g, ADA, "noise").unwrap();
        }
        let page = f.store.page(ch, ADA, 0).unwrap();
        assert_eq!(page.messages.len(), n);
        assert_eq!(page.end, -1);
        assert!(page.messages.windows(2).all(|w| w[0].message_id > w[1].message_id));
        assert_eq!(page.messages[0].message, format!("m{}", n - 1));
    }
}

#[test]
fn sending_requires_membership_and_a_short_body() {
    let f = fixture();
    let g = f.store.create_channel(ADA, "G", true).unwrap();
    assert!(matches!(f.store.send(g, BOB, "hi"), Err(CoreError::AccessDenied(_))));
    assert!(matches!(f.store.page(g, BOB, 0), Err(CoreError::AccessDenied(_))));
    assert!(matches!(
        f.store.send(g, ADA, &"a".repeat(1000)),
        Err(CoreError::InvalidArgument(_))
    ));
    assert!(matches!(f.store.send(77, ADA, "hi"), Err(CoreError::NotFound(_))));
}

#[test]
fn new_messages_carry_an_empty_like_slot_and_timestamp() {
    let f = fixture();
    let g = f.store.create_channel(ADA, "G", true).unwrap();
    let id = f.store.send(g, ADA, "hello").unwrap();

    let view = &f.store.page(g, ADA, 0).unwrap().messages[0];
    assert_eq!(view.message_id, id);
    assert_eq!(view.u_id, ADA);
    assert_eq!(view.time_created, common::START);
    assert!(!view.is_pinned);
    assert_eq!(view.reacts.len(), 1);
    assert_eq!(view.reacts[0].react_id, 1);
    assert!(view.reacts[0].u_ids.is_empty());
}

#[test]
fn react_then_unreact_round_trips() {
    let f = fixture();
    let g = f.store.create_channel(ADA, "G", true).unwrap();
    f.store.join(BOB, g).unwrap();
    let id = f.store.send(g, ADA, "hello").unwrap();

    f.store.react(BOB, id, 1).unwrap();
    let bob_view = f.store.page(g, BOB, 0).unwrap().messages[0].reacts[0].clone();
    assert!(bob_view.is_this_user_reacted);
    assert_eq!(bob_view.u_ids, vec![BOB]);
    let ada_view = f.store.page(g, ADA, 0).unwrap().messages[0].reacts[0].clone();
    assert!(!ada_view.is_this_user_reacted);

    assert!(matches!(f.store.react(BOB, id, 1), Err(CoreError::InvalidArgument(_))));

    f.store.unreact(BOB, id, 1).unwrap();
    let after = f.store.page(g, BOB, 0).unwrap().messages[0].reacts[0].clone();
    assert!(!after.is_this_user_reacted);
    assert!(after.u_ids.is_empty());

    assert!(matches!(f.store.unreact(BOB, id, 1), Err(CoreError::InvalidArgument(_))));
    assert!(matches!(f.store.react(BOB, id, 2), Err(CoreError::InvalidArgument(_))));
    assert!(matches!(f.store.react(CY, id, 1), Err(CoreError::AccessDenied(_))));
    assert!(matches!(f.store.react(BOB, 999, 1), Err(CoreError::NotFound(_))));
}

#[test]
fn edit_and_remove_need_author_or_owner() {
    let f = fixture();
    let g = f.store.create_channel(BOB, "G", true).unwrap();
    f.store.join(CY, g).unwrap();
    let bobs = f.store.send(g, BOB, "from bob").unwrap();
    let cys = f.store.send(g, CY, "from cy").unwrap();

    // Cy is a plain member.
    assert!(matches!(f.store.edit(CY, bobs, "hijack"), Err(CoreError::AccessDenied(_))));
    assert!(matches!(f.store.remove(CY, bobs), Err(CoreError::AccessDenied(_))));

    // Authors edit their own; channel owners edit anyone's.
    f.store.edit(CY, cys, "edited by cy").unwrap();
    f.store.edit(BOB, cys, "edited by bob").unwrap();
    // Global owner needs no membership.
    f.store.edit(ADA, bobs, "edited by ada").unwrap();

    let page = f.store.page(g, BOB, 0).unwrap();
    let bodies: Vec<_> = page.messages.iter().map(|m| m.message.as_str()).collect();
    assert_eq!(bodies, vec!["edited by bob", "edited by ada"]);

    f.store.remove(BOB, cys).unwrap();
    assert!(matches!(f.store.remove(BOB, cys), Err(CoreError::NotFound(_))));
    assert!(matches!(f.store.edit(BOB, cys, "gone"), Err(CoreError::NotFound(_))));
}

#[test]
fn empty_edit_removes_and_ids_are_not_reused() {
    let f = fixture();
    let g = f.store.create_channel(ADA, "G", true).unwrap();
    let first = f.store.send(g, ADA, "one").unwrap();
    let second = f.store.send(g, ADA, "two").unwrap();

    f.store.edit(ADA, second, "").unwrap();
    let page = f.store.page(g, ADA, 0).unwrap();
    assert_eq!(page.messages.len(), 1);
    assert_eq!(page.messages[0].message_id, first);

    let third = f.store.send(g, ADA, "three").unwrap();
    assert!(third > second);
}

#[test]
fn pinning_rules() {
    let f = fixture();
    let g = f.store.create_channel(ADA, "G", true).unwrap();
    f.store.join(BOB, g).unwrap();
    f.store.join(CY, g).unwrap();
    let id = f.store.send(g, BOB, "pin me").unwrap();

    assert!(matches!(f.store.pin(CY, id), Err(CoreError::AccessDenied(_))));
    f.store.pin(BOB, id).unwrap();
    assert!(f.store.page(g, BOB, 0).unwrap().messages[0].is_pinned);
    assert!(matches!(f.store.pin(ADA, id), Err(CoreError::InvalidArgument(_))));

    f.store.unpin(ADA, id).unwrap();
    assert!(matches!(f.store.unpin(BOB, id), Err(CoreError::InvalidArgument(_))));
}

#[test]
fn message_ids_are_global_across_channels() {
    let f = fixture();
    let a = f.store.create_channel(ADA, "a", true).unwrap();
    let b = f.store.create_channel(ADA, "b", true).unwrap();
    let m1 = f.store.send(a, ADA, "1").unwrap();
    let m2 = f.store.send(b, ADA, "2").unwrap();
    let m3 = f.store.send(a, ADA, "3").unwrap();
    assert!(m1 < m2 && m2 < m3);
}

#[test]
fn search_only_sees_the_actors_channels() {
    let f = fixture();
    let mine = f.store.create_channel(BOB, "mine", true).unwrap();
    let theirs = f.store.create_channel(CY, "theirs", true).unwrap();
    f.store.send(mine, BOB, "lunch at noon").unwrap();
    f.store.send(mine, BOB, "never mind").unwrap();
    f.store.send(mine, BOB, "lunch moved").unwrap();
    f.store.send(theirs, CY, "lunch secret").unwrap();

    let hits = f.store.search(BOB, "lunch").unwrap();
    let bodies: Vec<_> = hits.iter().map(|m| m.message.as_str()).collect();
    assert_eq!(bodies, vec!["lunch moved", "lunch at noon"]);
    assert!(f.store.search(ADA, "lunch").unwrap().is_empty());
}

#[test]
fn hangman_is_played_through_messages() {
    let f = fixture();
    let g = f.store.create_channel(ADA, "G", true).unwrap();

    assert!(matches!(
        f.store.send(g, ADA, "/guess a"),
        Err(CoreError::InvalidArgument(_))
    ));

    let started = f.store.send(g, ADA, "/hangman").unwrap();
    let page = f.store.page(g, ADA, 0).unwrap();
    assert_eq!(page.messages[0].message_id, started);
    assert!(page.messages[0].message.starts_with("Welcome to hangman!\n_ _ _ _ _ _"));

    let guessed = f.store.send(g, ADA, "/guess q").unwrap();
    let body = &f.store.page(g, ADA, 0).unwrap().messages[0];
    assert_eq!(body.message_id, guessed);
    assert!(body.message.starts_with("Guess a letter!\n"));
    assert!(body.message.ends_with("You have guessed: q"));

    assert!(matches!(
        f.store.send(g, ADA, "/guess q"),
        Err(CoreError::InvalidArgument(_))
    ));
}

#[test]
fn concurrent_sends_to_one_channel_keep_order() {
    let f = fixture();
    let g = f.store.create_channel(ADA, "G", true).unwrap();

    thread::scope(|s| {
        for t in 0..8 {
            let store = &f.store;
            s.spawn(move || {
                for i in 0..20 {
                    store.send(g, ADA, &format!("{t}-{i}")).unwrap();
                }
            });
        }
    });

    let mut seen = Vec::new();
    let mut start = 0;
    loop {
        let page = f.store.page(g, ADA, start).unwrap();
        seen.extend(page.messages.iter().map(|m| m.message_id));
        if page.end == -1 {
            break;
        }
        start = page.end as usize;
    }
    assert_eq!(seen.len(), 160);
    assert!(seen.windows(2).all(|w| w[0] > w[1]));
}
