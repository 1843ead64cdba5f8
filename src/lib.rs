/*!
# Timetable Scheduler Portal

A departmental timetable-scheduling portal built in Rust.

## Overview

This project is a migration of an existing scheduling portal (Next.js
frontend plus a FastAPI backend) to a single Rust web application. It
hosts the authentication flow, the role-scoped dashboards, and the JSON
API the dashboard forms call for managing scheduling resources.

## Architecture

The application follows a client-server architecture:

### Frontend Layer
- **Technologies**: HTML, CSS, vanilla JS fetch calls
- **Key Components**:
  - Landing page and auth card (login/signup)
  - Role-scoped dashboards (student, faculty, coordinator)
  - Toast overlay polling the notification queue

### Backend Layer
- **Technologies**: Rust, axum
- **Core Components**:
  - Session Resolver - Maps an authenticated session to its landing
    destination (authoritative profile role, provider claim fallback,
    degraded student default)
  - Toast Queue - Ordered in-memory notifications with independent,
    cancellable expiry timers
  - Identity Provider - Argon2-hashed accounts, uuid bearer sessions,
    signup role claims and authoritative profile rows
  - Resource API - Divisions, faculty and subjects CRUD with subject
    assignment and credential provisioning

### Data Persistence Layer
- JSON collections under the database directory (users, profiles,
  divisions, faculty, subjects)
- Sessions and toasts are in-memory only and cleared by a restart

## Key Features

- Role-based post-login routing with a tolerant fallback chain
- Self-expiring toast notifications with race-free dismissal
- Faculty onboarding with generated credentials delivered by email
- Resource management endpoints consumed by the coordinator dashboard
- Bearer-token API auth with a session-cookie fallback for pages

## Modules

- **roles**: Session resolver (roles, claims, destinations)
- **toast**: Toast notification queue
- **login**: Identity provider, sessions, auth handlers and middleware
- **config**: Environment-based settings
- **saving**: JSON collection persistence
- **mailer**: Credential mail delivery
- **divisions / faculty / subjects**: Resource CRUD endpoints
- **app**: Routing, middleware and server loop

## REST API Endpoints

- `POST /auth/signup`, `POST /auth/login`, `POST /auth/logout`,
  `GET /auth/me`
- `GET/POST /api/divisions`, `GET/PUT/DELETE /api/divisions/{id}`
- `GET/POST /api/faculty`, `GET/PUT/DELETE /api/faculty/{id}`,
  `POST /api/faculty/{id}/subjects`
- `GET/POST /api/subjects`, `GET/PUT/DELETE /api/subjects/{id}`
- `GET/POST /api/toasts`, `DELETE /api/toasts/{id}`
- `GET /health`
*/

// Re-export all modules so they appear in the documentation
pub mod app;
pub mod config;
pub mod divisions;
pub mod faculty;
pub mod login;
pub mod mailer;
pub mod roles;
pub mod saving;
pub mod subjects;
pub mod toast;

/// Re-export the core types to make them easier to use
pub use config::Settings;
pub use roles::{Destination, ProfileLookup, Resolution, Role, RoleClaim, resolve_destination};
pub use toast::{Toast, ToastKind, ToastQueue};
