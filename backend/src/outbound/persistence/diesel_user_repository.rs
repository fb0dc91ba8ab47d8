//! PostgreSQL-backed `UserRepository`.
//!
//! A user is one `users` row plus at most one of `students` / `teachers`;
//! creation and update write both inside a single transaction, and lookups
//! read both inside one read-only snapshot.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::scoped_futures::ScopedFutureExt;
use diesel_async::{AsyncConnection, AsyncPgConnection, RunQueryDsl};

use crate::domain::ports::{UserPersistenceError, UserRepository};
use crate::domain::{
    Email, NewUser, Role, RoleProfile, StudentNumber, TeacherNumber, User, UserId,
};

use super::diesel_error_mapping::port_error_mapping;
use super::models::{NewUserRow, StudentRow, TeacherRow, UserChangeset, UserRow};
use super::pool::DbPool;
use super::row_mapping::{UserRows, fetch_profiles, user_from_rows};
use super::schema::{students, teachers, users};

port_error_mapping!(UserPersistenceError);

/// Diesel implementation of [`UserRepository`].
#[derive(Clone)]
pub struct DieselUserRepository {
    pool: DbPool,
}

impl DieselUserRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn to_users(bundles: Vec<UserRows>) -> Result<Vec<User>, UserPersistenceError> {
    bundles
        .into_iter()
        .map(|bundle| user_from_rows(bundle).map_err(UserPersistenceError::query))
        .collect()
}

fn profile_value(user: &NewUser, field: &str) -> String {
    match (field, &user.profile) {
        ("email", _) => user.email.as_str().to_owned(),
        ("studentId", RoleProfile::Student(profile)) => {
            profile.student_number().as_str().to_owned()
        }
        ("teacherId", RoleProfile::Teacher(profile)) => {
            profile.teacher_number().as_str().to_owned()
        }
        _ => String::new(),
    }
}

async fn insert_profile(
    conn: &mut AsyncPgConnection,
    user_id: i64,
    profile: &RoleProfile,
) -> QueryResult<()> {
    match profile {
        RoleProfile::Admin => {}
        RoleProfile::Student(profile) => {
            diesel::insert_into(students::table)
                .values(StudentRow {
                    user_id,
                    student_number: profile.student_number().as_str().to_owned(),
                    program: profile.program().to_owned(),
                    year: profile.year().to_owned(),
                })
                .execute(conn)
                .await?;
        }
        RoleProfile::Teacher(profile) => {
            diesel::insert_into(teachers::table)
                .values(TeacherRow {
                    user_id,
                    teacher_number: profile.teacher_number().as_str().to_owned(),
                    department: profile.department().to_owned(),
                })
                .execute(conn)
                .await?;
        }
    }
    Ok(())
}

async fn update_profile(
    conn: &mut AsyncPgConnection,
    user_id: i64,
    profile: &RoleProfile,
) -> QueryResult<()> {
    match profile {
        RoleProfile::Admin => {}
        RoleProfile::Student(profile) => {
            diesel::update(students::table.find(user_id))
                .set(StudentRow {
                    user_id,
                    student_number: profile.student_number().as_str().to_owned(),
                    program: profile.program().to_owned(),
                    year: profile.year().to_owned(),
                })
                .execute(conn)
                .await?;
        }
        RoleProfile::Teacher(profile) => {
            diesel::update(teachers::table.find(user_id))
                .set(TeacherRow {
                    user_id,
                    teacher_number: profile.teacher_number().as_str().to_owned(),
                    department: profile.department().to_owned(),
                })
                .execute(conn)
                .await?;
        }
    }
    Ok(())
}

#[async_trait]
impl UserRepository for DieselUserRepository {
    async fn find_by_id(&self, id: UserId) -> Result<Option<User>, UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let id = id.get();
        let bundles = conn
            .build_transaction()
            .repeatable_read()
            .read_only()
            .run(|conn| {
                async move {
                    let rows = users::table
                        .find(id)
                        .select(UserRow::as_select())
                        .load(conn)
                        .await?;
                    fetch_profiles(conn, rows).await
                }
                .scope_boxed()
            })
            .await
            .map_err(|err| map_read_error(err, "find user by id"))?;
        Ok(to_users(bundles)?.into_iter().next())
    }

    async fn find_by_email(&self, email: &Email) -> Result<Option<User>, UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let email = email.as_str();
        let bundles = conn
            .build_transaction()
            .repeatable_read()
            .read_only()
            .run(|conn| {
                async move {
                    let rows = users::table
                        .filter(users::email.eq(email))
                        .select(UserRow::as_select())
                        .load(conn)
                        .await?;
                    fetch_profiles(conn, rows).await
                }
                .scope_boxed()
            })
            .await
            .map_err(|err| map_read_error(err, "find user by email"))?;
        Ok(to_users(bundles)?.into_iter().next())
    }

    async fn exists_by_email(&self, email: &Email) -> Result<bool, UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        diesel::select(diesel::dsl::exists(
            users::table.filter(users::email.eq(email.as_str())),
        ))
        .get_result::<bool>(&mut conn)
        .await
        .map_err(|err| map_read_error(err, "check email"))
    }

    async fn find_by_student_number(
        &self,
        number: &StudentNumber,
    ) -> Result<Option<User>, UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let number = number.as_str();
        let bundles = conn
            .build_transaction()
            .repeatable_read()
            .read_only()
            .run(|conn| {
                async move {
                    let rows = users::table
                        .inner_join(students::table)
                        .filter(students::student_number.eq(number))
                        .select(UserRow::as_select())
                        .load(conn)
                        .await?;
                    fetch_profiles(conn, rows).await
                }
                .scope_boxed()
            })
            .await
            .map_err(|err| map_read_error(err, "find student by number"))?;
        Ok(to_users(bundles)?.into_iter().next())
    }

    async fn find_by_teacher_number(
        &self,
        number: &TeacherNumber,
    ) -> Result<Option<User>, UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let number = number.as_str();
        let bundles = conn
            .build_transaction()
            .repeatable_read()
            .read_only()
            .run(|conn| {
                async move {
                    let rows = users::table
                        .inner_join(teachers::table)
                        .filter(teachers::teacher_number.eq(number))
                        .select(UserRow::as_select())
                        .load(conn)
                        .await?;
                    fetch_profiles(conn, rows).await
                }
                .scope_boxed()
            })
            .await
            .map_err(|err| map_read_error(err, "find teacher by number"))?;
        Ok(to_users(bundles)?.into_iter().next())
    }

    async fn list(&self, role: Option<Role>) -> Result<Vec<User>, UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let role = role.map(Role::as_str);
        let bundles = conn
            .build_transaction()
            .repeatable_read()
            .read_only()
            .run(|conn| {
                async move {
                    let mut query = users::table
                        .select(UserRow::as_select())
                        .order(users::id.asc())
                        .into_boxed();
                    if let Some(role) = role {
                        query = query.filter(users::role.eq(role));
                    }
                    let rows = query.load(conn).await?;
                    fetch_profiles(conn, rows).await
                }
                .scope_boxed()
            })
            .await
            .map_err(|err| map_read_error(err, "list users"))?;
        to_users(bundles)
    }

    async fn create(&self, user: NewUser) -> Result<User, UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let role = user.profile.role();
        let row = NewUserRow {
            name: user.name.as_str(),
            email: user.email.as_str(),
            password_hash: user.credential.as_str(),
            role: role.as_str(),
            status: user.status.as_str(),
            created_at: user.created_at,
            updated_at: user.created_at,
        };
        let profile = &user.profile;

        let id = conn
            .transaction(|conn| {
                async move {
                    let id: i64 = diesel::insert_into(users::table)
                        .values(&row)
                        .returning(users::id)
                        .get_result(conn)
                        .await?;
                    insert_profile(conn, id, profile).await?;
                    Ok::<_, diesel::result::Error>(id)
                }
                .scope_boxed()
            })
            .await
            .map_err(|err| map_write_error(err, "create user", |field| profile_value(&user, field)))?;
        drop(conn);

        Ok(User::from_new(UserId::new(id), user))
    }

    async fn update(&self, user: &User) -> Result<bool, UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let id = user.id().get();
        let changes = UserChangeset {
            name: user.name().as_str(),
            status: user.status().as_str(),
            password_hash: user.credential().as_str(),
            updated_at: user.updated_at(),
        };
        let profile = user.profile();

        conn.transaction(|conn| {
            async move {
                let touched = diesel::update(users::table.find(id))
                    .set(&changes)
                    .execute(conn)
                    .await?;
                if touched == 0 {
                    return Ok(false);
                }
                update_profile(conn, id, profile).await?;
                Ok::<_, diesel::result::Error>(true)
            }
            .scope_boxed()
        })
        .await
        .map_err(|err| {
            map_write_error(err, "update user", |field| match (field, profile) {
                ("studentId", RoleProfile::Student(p)) => p.student_number().as_str().to_owned(),
                ("teacherId", RoleProfile::Teacher(p)) => p.teacher_number().as_str().to_owned(),
                _ => String::new(),
            })
        })
    }
}
