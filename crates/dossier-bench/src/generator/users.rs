//! User account builders.

use dossier_core::newtypes::{UserId, Username};
use dossier_core::role::Role;
use dossier_core::structures::User;
use rand::Rng;
use rand::rngs::StdRng;

use super::GeneratorConfig;

fn user_id(index: usize) -> UserId {
    let s = format!("u{index:06}");
    UserId::try_from(s.as_str()).unwrap_or_else(|_| unreachable!())
}

fn username(index: usize) -> Username {
    let s = format!("member.{index:06}");
    Username::try_from(s.as_str()).unwrap_or_else(|_| unreachable!())
}

/// Builds `config.num_users` users.
///
/// The first `num_superusers` accounts are superusers without a role. The
/// next [`Role::COUNT`] accounts hold each role once, so every tier is
/// populated whenever the organisation is large enough; the rest draw a
/// random role or none.
pub fn build_users(config: &GeneratorConfig, rng: &mut StdRng) -> Vec<User> {
    let superusers = config.num_superusers.min(config.num_users);
    let mut users = Vec::with_capacity(config.num_users);
    for i in 0..config.num_users {
        let role = if i < superusers {
            None
        } else if i - superusers < Role::COUNT {
            Some(Role::ALL[i - superusers])
        } else if rng.gen_bool(config.no_role_fraction) {
            None
        } else {
            Some(Role::ALL[rng.gen_range(0..Role::COUNT)])
        };
        let mut user = User::new(user_id(i), username(i), role);
        user.is_superuser = i < superusers;
        users.push(user);
    }
    users
}
